use crate::error::InventoryError;
use axum::{
    Form,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// `Form<T>` whose rejection renders as an inventory error page instead of
/// axum's plain-text 4xx body.
pub struct InventoryForm<T>(pub T);

impl<T, S> FromRequest<S> for InventoryForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = InventoryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(rejection) => Err(InventoryError::InvalidForm(rejection.body_text())),
        }
    }
}
