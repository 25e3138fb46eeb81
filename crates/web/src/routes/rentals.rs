//! Rental route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use sakila_core::{CustomerId, InventoryId, Rental, RentalId, StaffId};

use crate::display::{display_datetime, display_optional};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash;
use crate::forms::{FormErrors, RentalForm};
use crate::middleware::RequireAuth;
use crate::pagination::{Page, PageQuery, RENTALS_PER_PAGE};
use crate::routes::{PageContext, remote_failure, remote_failure_on_form};

pub const RENTAL_CREATED_MESSAGE: &str = "Reserva creada correctamente";
pub const RENTAL_RETURNED_MESSAGE: &str = "Reserva devuelta correctamente";

/// A rental with its timestamps formatted for display.
#[derive(Debug, Clone)]
pub struct RentalView {
    pub id: RentalId,
    pub rental_date: String,
    pub inventory_id: InventoryId,
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub return_date: Option<String>,
}

impl RentalView {
    #[must_use]
    pub const fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }
}

impl From<Rental> for RentalView {
    fn from(rental: Rental) -> Self {
        Self {
            id: rental.rental_id,
            rental_date: display_datetime(&rental.rental_date),
            inventory_id: rental.inventory_id,
            customer_id: rental.customer_id,
            staff_id: rental.staff_id,
            return_date: display_optional(rental.return_date.as_deref()),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "rentals/list.html")]
pub struct RentalListTemplate {
    pub ctx: PageContext,
    pub page: Page<RentalView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "rentals/detail.html")]
pub struct RentalDetailTemplate {
    pub ctx: PageContext,
    pub rental: RentalView,
}

#[derive(Template, WebTemplate)]
#[template(path = "rentals/form.html")]
pub struct RentalFormTemplate {
    pub ctx: PageContext,
    pub form: RentalForm,
    pub errors: FormErrors,
}

// =============================================================================
// Handlers
// =============================================================================

/// Paginated list of all rentals.
#[instrument(skip(api, session))]
pub async fn index(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let rentals = match api.list_rentals().await {
        Ok(rentals) => rentals,
        Err(e) => return Ok(remote_failure(&session, &e, "/").await?.into_response()),
    };

    let page = Page::new(rentals, query.page.as_deref(), RENTALS_PER_PAGE).map(RentalView::from);

    Ok(RentalListTemplate {
        ctx: PageContext::load(&session).await?,
        page,
    }
    .into_response())
}

/// One rental.
#[instrument(skip(api, session))]
pub async fn show(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Path(id): Path<RentalId>,
) -> Result<Response> {
    let rental = match api.get_rental(id).await {
        Ok(rental) => rental,
        Err(e) => return Ok(remote_failure(&session, &e, "/rentals").await?.into_response()),
    };

    Ok(RentalDetailTemplate {
        ctx: PageContext::load(&session).await?,
        rental: rental.into(),
    }
    .into_response())
}

/// Empty rental form.
#[instrument(skip_all)]
pub async fn new_page(_auth: RequireAuth, session: Session) -> Result<impl IntoResponse> {
    Ok(RentalFormTemplate {
        ctx: PageContext::load(&session).await?,
        form: RentalForm::default(),
        errors: FormErrors::default(),
    })
}

/// Start a rental now.
#[instrument(skip(api, session))]
pub async fn create(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Form(form): Form<RentalForm>,
) -> Result<Response> {
    let rental = match form.validate(rental_timestamp()) {
        Ok(rental) => rental,
        Err(errors) => return render_form(&session, form, errors).await,
    };

    match api.create_rental(&rental).await {
        Ok(created) => {
            let rental_id = created.rental_id.to_string();
            add_breadcrumb("rentals", "Created rental", Some(&[("rental_id", rental_id.as_str())]));
            flash::success(&session, RENTAL_CREATED_MESSAGE).await?;
            Ok(Redirect::to("/rentals").into_response())
        }
        Err(e) => match remote_failure_on_form(&session, &e).await? {
            Some(redirect) => Ok(redirect.into_response()),
            None => render_form(&session, form, FormErrors::default()).await,
        },
    }
}

/// Mark a rental as returned.
#[instrument(skip(api, session))]
pub async fn mark_returned(
    RequireAuth { api, .. }: RequireAuth,
    session: Session,
    Path(id): Path<RentalId>,
) -> Result<Redirect> {
    match api.return_rental(id).await {
        Ok(_) => {
            let rental_id = id.to_string();
            add_breadcrumb("rentals", "Returned rental", Some(&[("rental_id", rental_id.as_str())]));
            flash::success(&session, RENTAL_RETURNED_MESSAGE).await?;
            Ok(Redirect::to(&format!("/rentals/{id}")))
        }
        Err(e) => remote_failure(&session, &e, "/rentals").await,
    }
}

async fn render_form(session: &Session, form: RentalForm, errors: FormErrors) -> Result<Response> {
    Ok(RentalFormTemplate {
        ctx: PageContext::load(session).await?,
        form,
        errors,
    }
    .into_response())
}

/// Local wall-clock time, ISO-8601 without offset, as the remote expects.
fn rental_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
