use std::sync::Arc;

use super::{Collection, References, Resource};
use crate::core::shared::models::Support;
use crate::core::shared::state::AppState;
use crate::directory::Identity;
use crate::store::Repository;
use crate::web::html::{input_field, select_field};

impl Resource for Support {
    const SLUG: &'static str = "supports";
    const TITLE: &'static str = "Suportes";
    const SINGULAR: &'static str = "suporte";
    const REFERENCES: &'static [Collection] = &[Collection::Analysts];

    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.supports.clone()
    }

    fn defaults(_identity: &Identity) -> Self {
        Self::default()
    }

    fn headers() -> &'static [&'static str] {
        &["Nome", "Analista"]
    }

    fn cells(record: &Self, refs: &References, _date_format: &str) -> Vec<String> {
        vec![
            record.name.clone(),
            refs.analyst_name(&record.analyst_id).to_string(),
        ]
    }

    fn form_fields(fields: &Self, refs: &References) -> String {
        [
            input_field("Nome", "name", "text", &fields.name, true),
            select_field(
                "Analista",
                "analystId",
                &refs.analyst_options(),
                fields.analyst_id.as_str(),
                "Selecione um analista",
                true,
            ),
        ]
        .concat()
    }
}
