//! HTML pages, embedded at compile time and rendered with tera.

use axum::response::Html;
use std::sync::LazyLock;
use tera::{Context, Tera};

use crate::error::ColgadosError;

static TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("index.html", include_str!("../templates/index.html")),
        ("register.html", include_str!("../templates/register.html")),
        ("login.html", include_str!("../templates/login.html")),
        ("secrets.html", include_str!("../templates/secrets.html")),
        (
            "lista_de_colgados.html",
            include_str!("../templates/lista_de_colgados.html"),
        ),
        (
            "atributos_lineas.html",
            include_str!("../templates/atributos_lineas.html"),
        ),
        ("add.html", include_str!("../templates/add.html")),
        ("edit.html", include_str!("../templates/edit.html")),
        ("_plex_table.html", include_str!("../templates/_plex_table.html")),
        (
            "rates_actuales.html",
            include_str!("../templates/rates_actuales.html"),
        ),
        (
            "test_json_plex.html",
            include_str!("../templates/test_json_plex.html"),
        ),
        (
            "test_json_plex_sharepoint.html",
            include_str!("../templates/test_json_plex_sharepoint.html"),
        ),
    ])
    .expect("embedded templates must parse");
    tera
});

/// Context every page needs for the layout.
pub fn page_context(logged_in: bool, flashes: &[String]) -> Context {
    let mut ctx = Context::new();
    ctx.insert("logged_in", &logged_in);
    ctx.insert("flashes", flashes);
    ctx
}

pub fn render(name: &str, ctx: &Context) -> Result<Html<String>, ColgadosError> {
    Ok(Html(TEMPLATES.render(name, ctx)?))
}
