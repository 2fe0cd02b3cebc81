use std::sync::Arc;

use super::{Collection, References, Resource};
use crate::core::shared::models::Reason;
use crate::core::shared::state::AppState;
use crate::directory::Identity;
use crate::store::Repository;
use crate::web::html::input_field;

impl Resource for Reason {
    const SLUG: &'static str = "reasons";
    const TITLE: &'static str = "Motivos";
    const SINGULAR: &'static str = "motivo";
    const REFERENCES: &'static [Collection] = &[];

    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.reasons.clone()
    }

    fn defaults(_identity: &Identity) -> Self {
        Self::default()
    }

    fn headers() -> &'static [&'static str] {
        &["Descrição"]
    }

    fn cells(record: &Self, _refs: &References, _date_format: &str) -> Vec<String> {
        vec![record.description.clone()]
    }

    fn form_fields(fields: &Self, _refs: &References) -> String {
        input_field("Descrição", "description", "text", &fields.description, true)
    }
}
