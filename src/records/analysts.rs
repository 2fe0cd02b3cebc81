use std::sync::Arc;

use super::{Collection, References, Resource};
use crate::core::shared::models::Analyst;
use crate::core::shared::state::AppState;
use crate::directory::Identity;
use crate::store::Repository;
use crate::web::html::input_field;

impl Resource for Analyst {
    const SLUG: &'static str = "analysts";
    const TITLE: &'static str = "Analistas";
    const SINGULAR: &'static str = "analista";
    const REFERENCES: &'static [Collection] = &[];

    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.analysts.clone()
    }

    fn defaults(_identity: &Identity) -> Self {
        Self::default()
    }

    fn headers() -> &'static [&'static str] {
        &["Nome", "E-mail", "Equipe"]
    }

    fn cells(record: &Self, _refs: &References, _date_format: &str) -> Vec<String> {
        vec![record.name.clone(), record.email.clone(), record.team.clone()]
    }

    fn form_fields(fields: &Self, _refs: &References) -> String {
        [
            input_field("Nome", "name", "text", &fields.name, true),
            input_field("E-mail", "email", "email", &fields.email, true),
            input_field("Equipe", "team", "text", &fields.team, true),
        ]
        .concat()
    }
}
