use crate::db::{DigitalDisplay, Model};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(rename = "schedulerSystem")]
    pub scheduler_system: String,
}

/// Body of `POST /addModel`: the model's measurements plus the display that
/// was waiting for it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddModelForm {
    pub model_no: String,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub depth: f64,
    pub screen_size: f64,
    pub serial_no: String,
    pub scheduler_system: String,
}

impl AddModelForm {
    pub fn into_rows(self) -> (Model, DigitalDisplay) {
        let display = DigitalDisplay {
            serial_no: self.serial_no,
            scheduler_system: self.scheduler_system,
            model_no: self.model_no.clone(),
        };
        let model = Model {
            model_no: self.model_no,
            width: self.width,
            height: self.height,
            weight: self.weight,
            depth: self.depth,
            screen_size: self.screen_size,
        };
        (model, display)
    }
}

/// Query string of `GET /addModel`, carried over from a rejected insert.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddModelPrefill {
    pub model_no: Option<String>,
    pub serial_no: Option<String>,
    pub scheduler_system: Option<String>,
}

impl AddModelPrefill {
    /// `/addModel?modelNo=..&serialNo=..&schedulerSystem=..`, URL-encoded.
    pub fn redirect_target(display: &DigitalDisplay) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("modelNo", &display.model_no)
            .append_pair("serialNo", &display.serial_no)
            .append_pair("schedulerSystem", &display.scheduler_system)
            .finish();
        format!("/addModel?{query}")
    }
}
