use crate::error::InventoryError;
use crate::middleware::{DbSession, InventoryForm};
use crate::types::{AddModelForm, AddModelPrefill};
use crate::views;
use axum::{
    extract::{Path, Query},
    response::{Html, Redirect},
};

/// GET /model/{model_no}
pub async fn model_detail(
    DbSession { storage, .. }: DbSession,
    Path(model_no): Path<String>,
) -> Result<Html<String>, InventoryError> {
    let model = storage.get_model(&model_no).await?;
    Ok(views::model_detail(&model))
}

/// GET /addModel?modelNo=..&serialNo=..&schedulerSystem=..
pub async fn add_model_page(
    _session: DbSession,
    Query(prefill): Query<AddModelPrefill>,
) -> Html<String> {
    views::add_model_form(&prefill)
}

/// POST /addModel -> model and its display in one transaction.
pub async fn add_model(
    DbSession { storage, .. }: DbSession,
    InventoryForm(form): InventoryForm<AddModelForm>,
) -> Result<Redirect, InventoryError> {
    let (model, display) = form.into_rows();
    storage.add_model_with_display(&model, &display).await?;
    Ok(Redirect::to("/display"))
}
