use crate::db::DigitalDisplay;
use crate::db::storage::InsertOutcome;
use crate::error::InventoryError;
use crate::middleware::{DbSession, InventoryForm};
use crate::types::{AddModelPrefill, SearchForm};
use crate::views;
use axum::{
    extract::Path,
    response::{Html, Redirect},
};
use tracing::info;

/// GET /display
pub async fn list_displays(
    DbSession { storage, .. }: DbSession,
) -> Result<Html<String>, InventoryError> {
    let displays = storage.list_displays().await?;
    Ok(views::display_list(&displays))
}

/// GET /search
pub async fn search_page(_session: DbSession) -> Html<String> {
    views::search_form()
}

/// POST /search/results
pub async fn search_results(
    DbSession { storage, .. }: DbSession,
    InventoryForm(form): InventoryForm<SearchForm>,
) -> Result<Html<String>, InventoryError> {
    let results = storage.search_by_scheduler(&form.scheduler_system).await?;
    Ok(views::search_results(&form.scheduler_system, &results))
}

/// GET /insert
pub async fn insert_page(_session: DbSession) -> Html<String> {
    views::insert_form()
}

/// POST /insert -> insert directly, or hand over to the add-model form when
/// the referenced model does not exist yet.
pub async fn insert_display(
    DbSession { storage, .. }: DbSession,
    InventoryForm(new_display): InventoryForm<DigitalDisplay>,
) -> Result<Redirect, InventoryError> {
    match storage.insert_display(&new_display).await? {
        InsertOutcome::Inserted => Ok(Redirect::to("/display")),
        InsertOutcome::ModelMissing => {
            info!(model_no = %new_display.model_no, "unknown model; redirecting to add-model");
            Ok(Redirect::to(&AddModelPrefill::redirect_target(&new_display)))
        }
    }
}

/// GET /update/{serial_no}
pub async fn update_page(
    DbSession { storage, .. }: DbSession,
    Path(serial_no): Path<String>,
) -> Result<Html<String>, InventoryError> {
    let display = storage.get_display(&serial_no).await?;
    Ok(views::update_form(&display))
}

/// POST /update/{serial_no}
pub async fn update_display(
    DbSession { storage, .. }: DbSession,
    Path(old_serial_no): Path<String>,
    InventoryForm(updated): InventoryForm<DigitalDisplay>,
) -> Result<Redirect, InventoryError> {
    storage.update_display(&old_serial_no, &updated).await?;
    Ok(Redirect::to("/display"))
}

/// POST /display/{serial_no}/delete -> delete, removing the model if it is now unused.
pub async fn delete_display(
    DbSession { storage, .. }: DbSession,
    Path(serial_no): Path<String>,
) -> Result<Redirect, InventoryError> {
    storage.delete_display(&serial_no).await?;
    Ok(Redirect::to("/display"))
}
