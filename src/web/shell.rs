//! Page layout and the route decision behind it.

use crate::directory::Identity;
use crate::security::auth_api::GateState;
use crate::web::html::html_escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Cadastros,
    Tickets,
    Relatorio,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::Cadastros, Page::Tickets, Page::Relatorio];

    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Cadastros => "/cadastros",
            Self::Tickets => "/tickets",
            Self::Relatorio => "/relatorio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Página Inicial",
            Self::Cadastros => "Cadastros",
            Self::Tickets => "Tickets",
            Self::Relatorio => "Relatório",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        Self::ALL.into_iter().find(|page| page.path() == path)
    }
}

pub const DEFAULT_PAGE: Page = Page::Dashboard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellState {
    Loading,
    Unauthenticated,
    Authenticated(Identity),
}

impl From<&GateState> for ShellState {
    fn from(gate: &GateState) -> Self {
        match gate {
            GateState::Uninitialized | GateState::Resolving => Self::Loading,
            GateState::Resolved(None) => Self::Unauthenticated,
            GateState::Resolved(Some(identity)) => Self::Authenticated(identity.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Placeholder,
    Login { return_to: String },
    Redirect(String),
    Render(Page),
    NotFound,
}

/// `target` is a path with optional query. Only a resolved identity reaches a page.
pub fn decide(target: &str, shell: &ShellState) -> RouteDecision {
    let path = target.split('?').next().unwrap_or(target);

    match shell {
        ShellState::Loading => RouteDecision::Placeholder,
        ShellState::Unauthenticated => RouteDecision::Login {
            return_to: target.to_string(),
        },
        ShellState::Authenticated(_) => {
            if path.is_empty() || path == "/" {
                return RouteDecision::Redirect(DEFAULT_PAGE.path().to_string());
            }
            match Page::from_path(path) {
                Some(page) => RouteDecision::Render(page),
                None => RouteDecision::NotFound,
            }
        }
    }
}

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\
        <html lang=\"pt-BR\">\
        <head>\
            <meta charset=\"utf-8\">\
            <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
            <title>{title} | Portal do Analista</title>\
            <link rel=\"stylesheet\" href=\"/static/portal.css\">\
            <script src=\"{htmx}\" defer></script>\
            <script src=\"/static/portal.js\" defer></script>\
        </head>\
        <body>{body}</body>\
        </html>",
        title = html_escape(title),
        htmx = HTMX_SRC,
        body = body,
    )
}

pub fn render_placeholder() -> String {
    document(
        "Carregando",
        "<div class=\"loading-placeholder\">Carregando...</div>",
    )
}

/// Bare page without header or sidebar, used by the login form.
pub fn render_standalone(title: &str, content: &str) -> String {
    document(title, &format!("<main class=\"standalone\">{content}</main>"))
}

pub fn render_page(active: Page, identity: &Identity, content: &str) -> String {
    let sidebar: String = Page::ALL
        .iter()
        .map(|page| {
            let class = if *page == active {
                "nav-item active"
            } else {
                "nav-item"
            };
            format!(
                "<a class=\"{}\" href=\"{}\">{}</a>",
                class,
                page.path(),
                html_escape(page.label())
            )
        })
        .collect();

    let body = format!(
        "<header class=\"app-header\">\
            <h1>Portal do Analista</h1>\
            <div class=\"user-area\">\
                <span class=\"user-email\" title=\"{name}\">{user}</span>\
                <form method=\"post\" action=\"/logout\">\
                    <button type=\"submit\" class=\"btn btn-link\">Sair</button>\
                </form>\
            </div>\
        </header>\
        <div class=\"app-body\">\
            <nav class=\"sidebar\">{sidebar}</nav>\
            <main class=\"content\">{content}</main>\
        </div>",
        name = html_escape(identity.label()),
        user = html_escape(&identity.email),
        sidebar = sidebar,
        content = content,
    );

    document(active.label(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            uid: "a1".into(),
            email: "maria@x.com".into(),
            display_name: None,
        }
    }

    #[test]
    fn test_loading_blocks_route_decisions() {
        assert_eq!(
            decide("/tickets", &ShellState::Loading),
            RouteDecision::Placeholder
        );
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        assert_eq!(
            decide("/tickets", &ShellState::Unauthenticated),
            RouteDecision::Login {
                return_to: "/tickets".into()
            }
        );
        assert_eq!(
            decide("/cadastros?tab=reasons", &ShellState::Unauthenticated),
            RouteDecision::Login {
                return_to: "/cadastros?tab=reasons".into()
            }
        );
    }

    #[test]
    fn test_authenticated_routes() {
        let shell = ShellState::Authenticated(identity());

        assert_eq!(
            decide("/", &shell),
            RouteDecision::Redirect("/dashboard".into())
        );
        assert_eq!(decide("/tickets", &shell), RouteDecision::Render(Page::Tickets));
        assert_eq!(
            decide("/cadastros?tab=supports", &shell),
            RouteDecision::Render(Page::Cadastros)
        );
        assert_eq!(
            decide("/relatorio/", &shell),
            RouteDecision::Render(Page::Relatorio)
        );
        assert_eq!(decide("/nowhere", &shell), RouteDecision::NotFound);
    }

    #[test]
    fn test_shell_state_from_gate() {
        let mut gate = GateState::default();
        assert_eq!(ShellState::from(&gate), ShellState::Loading);

        gate.finish(None);
        assert_eq!(ShellState::from(&gate), ShellState::Unauthenticated);

        gate.finish(Some(identity()));
        assert_eq!(ShellState::from(&gate), ShellState::Authenticated(identity()));
    }

    #[test]
    fn test_layout_highlights_active_page() {
        let html = render_page(Page::Tickets, &identity(), "<p>conteúdo</p>");

        assert!(html.contains("<a class=\"nav-item active\" href=\"/tickets\">Tickets</a>"));
        assert!(html.contains("<a class=\"nav-item\" href=\"/dashboard\">Página Inicial</a>"));
        assert!(html.contains("maria@x.com"));
        assert!(html.contains(">Sair</button>"));
        assert!(html.contains("<p>conteúdo</p>"));
    }
}
