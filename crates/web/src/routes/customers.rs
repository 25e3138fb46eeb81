//! Customer route handlers.
//!
//! Create, edit and delete mirror the remote API one call at a time. Edit and
//! delete fetch the customer first so a stale link lands back on the list
//! with the remote's error instead of an empty form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use sakila_core::{AddressId, Customer, CustomerId, StoreId};

use crate::api::ApiError;
use crate::display::display_optional;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash;
use crate::forms::{CustomerForm, FormErrors};
use crate::middleware::RequireAuth;
use crate::pagination::{CUSTOMERS_PER_PAGE, Page, PageQuery};
use crate::routes::rentals::RentalView;
use crate::routes::{PageContext, remote_failure, remote_failure_on_form};

pub const CUSTOMER_CREATED_MESSAGE: &str = "Cliente creado correctamente";
pub const CUSTOMER_UPDATED_MESSAGE: &str = "Cliente actualizado correctamente";
pub const CUSTOMER_DELETED_MESSAGE: &str = "Cliente eliminado";
pub const CUSTOMER_HAS_RENTALS_MESSAGE: &str =
    "No se puede eliminar este cliente, ya que tiene reservas activas asociadas.";

const LIST_PATH: &str = "/customers";

/// A customer with its timestamps formatted for display.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: CustomerId,
    pub store_id: StoreId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub address_id: AddressId,
    pub active: bool,
    pub create_date: Option<String>,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            full_name: customer.full_name(),
            create_date: display_optional(customer.create_date.as_deref()),
            id: customer.customer_id,
            store_id: customer.store_id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email.filter(|e| !e.trim().is_empty()),
            address_id: customer.address_id,
            active: customer.active,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "customers/list.html")]
pub struct CustomerListTemplate {
    pub ctx: PageContext,
    pub page: Page<CustomerView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "customers/detail.html")]
pub struct CustomerDetailTemplate {
    pub ctx: PageContext,
    pub customer: CustomerView,
    pub rentals: Vec<RentalView>,
}

/// Shared by create and edit; `customer` is set when editing.
#[derive(Template, WebTemplate)]
#[template(path = "customers/form.html")]
pub struct CustomerFormTemplate {
    pub ctx: PageContext,
    pub form: CustomerForm,
    pub errors: FormErrors,
    pub customer: Option<CustomerView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "customers/delete.html")]
pub struct CustomerDeleteTemplate {
    pub ctx: PageContext,
    pub customer: CustomerView,
}

// =============================================================================
// Read
// =============================================================================

/// Paginated list of all customers.
#[instrument(skip(api, session))]
pub async fn index(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let customers = match api.list_customers().await {
        Ok(customers) => customers,
        Err(e) => return Ok(remote_failure(&session, &e, "/").await?.into_response()),
    };

    let page =
        Page::new(customers, query.page.as_deref(), CUSTOMERS_PER_PAGE).map(CustomerView::from);

    Ok(CustomerListTemplate {
        ctx: PageContext::load(&session).await?,
        page,
    }
    .into_response())
}

/// One customer and their rental history.
#[instrument(skip(api, session))]
pub async fn show(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Path(id): Path<CustomerId>,
) -> Result<Response> {
    let fetched = async {
        let customer = api.get_customer(id).await?;
        let rentals = api.list_customer_rentals(id).await?;
        Ok::<_, ApiError>((customer, rentals))
    }
    .await;

    let (customer, rentals) = match fetched {
        Ok(found) => found,
        Err(e) => return Ok(remote_failure(&session, &e, LIST_PATH).await?.into_response()),
    };

    Ok(CustomerDetailTemplate {
        ctx: PageContext::load(&session).await?,
        customer: customer.into(),
        rentals: rentals.into_iter().map(RentalView::from).collect(),
    }
    .into_response())
}

// =============================================================================
// Create
// =============================================================================

/// Empty customer form; new customers start active.
#[instrument(skip_all)]
pub async fn new_page(_auth: RequireAuth, session: Session) -> Result<impl IntoResponse> {
    Ok(CustomerFormTemplate {
        ctx: PageContext::load(&session).await?,
        form: CustomerForm::initial(),
        errors: FormErrors::default(),
        customer: None,
    })
}

/// Create a customer.
#[instrument(skip(api, session))]
pub async fn create(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => return render_form(&session, form, errors, None).await,
    };

    match api.create_customer(&payload).await {
        Ok(created) => {
            let customer_id = created.customer_id.to_string();
            add_breadcrumb(
                "customers",
                "Created customer",
                Some(&[("customer_id", customer_id.as_str())]),
            );
            flash::success(&session, CUSTOMER_CREATED_MESSAGE).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => match remote_failure_on_form(&session, &e).await? {
            Some(redirect) => Ok(redirect.into_response()),
            None => render_form(&session, form, FormErrors::default(), None).await,
        },
    }
}

// =============================================================================
// Edit
// =============================================================================

/// Customer form prefilled from the remote.
#[instrument(skip(api, session))]
pub async fn edit_page(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Path(id): Path<CustomerId>,
) -> Result<Response> {
    match api.get_customer(id).await {
        Ok(customer) => {
            let form = CustomerForm::from_customer(&customer);
            render_form(&session, form, FormErrors::default(), Some(customer.into())).await
        }
        Err(e) => Ok(remote_failure(&session, &e, LIST_PATH).await?.into_response()),
    }
}

/// Replace a customer.
#[instrument(skip(api, session))]
pub async fn update(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Path(id): Path<CustomerId>,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let customer = match api.get_customer(id).await {
        Ok(customer) => customer,
        Err(e) => return Ok(remote_failure(&session, &e, LIST_PATH).await?.into_response()),
    };

    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => return render_form(&session, form, errors, Some(customer.into())).await,
    };

    match api.update_customer(id, &payload).await {
        Ok(_) => {
            let customer_id = id.to_string();
            add_breadcrumb(
                "customers",
                "Updated customer",
                Some(&[("customer_id", customer_id.as_str())]),
            );
            flash::success(&session, CUSTOMER_UPDATED_MESSAGE).await?;
            Ok(Redirect::to(&format!("{LIST_PATH}/{id}")).into_response())
        }
        Err(e) => Ok(remote_failure(&session, &e, LIST_PATH).await?.into_response()),
    }
}

async fn render_form(
    session: &Session,
    form: CustomerForm,
    errors: FormErrors,
    customer: Option<CustomerView>,
) -> Result<Response> {
    Ok(CustomerFormTemplate {
        ctx: PageContext::load(session).await?,
        form,
        errors,
        customer,
    }
    .into_response())
}

// =============================================================================
// Delete
// =============================================================================

/// Delete confirmation page.
#[instrument(skip(api, session))]
pub async fn delete_page(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Path(id): Path<CustomerId>,
) -> Result<Response> {
    match api.get_customer(id).await {
        Ok(customer) => Ok(CustomerDeleteTemplate {
            ctx: PageContext::load(&session).await?,
            customer: customer.into(),
        }
        .into_response()),
        Err(e) => Ok(remote_failure(&session, &e, LIST_PATH).await?.into_response()),
    }
}

/// Delete a customer.
///
/// The remote refuses with 409 while the customer still has rentals; that
/// case gets its own message.
#[instrument(skip(api, session))]
pub async fn delete(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Path(id): Path<CustomerId>,
) -> Result<Redirect> {
    if let Err(e) = api.get_customer(id).await {
        return remote_failure(&session, &e, LIST_PATH).await;
    }

    match api.delete_customer(id).await {
        Ok(()) => {
            let customer_id = id.to_string();
            add_breadcrumb(
                "customers",
                "Deleted customer",
                Some(&[("customer_id", customer_id.as_str())]),
            );
            flash::success(&session, CUSTOMER_DELETED_MESSAGE).await?;
            Ok(Redirect::to(LIST_PATH))
        }
        Err(ApiError::Conflict { message }) => {
            tracing::info!(%message, "Customer still has rentals");
            flash::error(&session, CUSTOMER_HAS_RENTALS_MESSAGE).await?;
            Ok(Redirect::to(LIST_PATH))
        }
        Err(e) => remote_failure(&session, &e, LIST_PATH).await,
    }
}
