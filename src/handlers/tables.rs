use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::info;

use crate::api::plex_api::PlexApi;
use crate::error::ColgadosError;
use crate::middleware::auth::AuthUser;
use crate::router::ColgadosState;
use crate::templates::{page_context, render};
use crate::types::plex::{PlexInputs, PlexResponse, PlexTable};
use crate::types::table::DataTable;

fn render_plex_table(
    template: &str,
    table: &PlexTable,
) -> Result<Html<String>, ColgadosError> {
    let mut ctx = page_context(true, &[]);
    ctx.insert("columns", &table.columns);
    ctx.insert("rows", &table.display_rows());
    render(template, &ctx)
}

/// GET /rates_actuales -> live rates from the PLEX data source.
pub async fn rates_actuales(
    _user: AuthUser,
    State(state): State<ColgadosState>,
) -> Result<impl IntoResponse, ColgadosError> {
    let cfg = &state.config;
    let inputs = PlexInputs {
        part_key: cfg.plex_part_key,
        part_operation_key: cfg.plex_part_operation_key,
    };
    let table =
        PlexApi::execute_datasource(&state.client, &cfg.plex_endpoint, &cfg.plex_token, inputs)
            .await?
            .into_first_table()?;
    render_plex_table("rates_actuales.html", &table)
}

/// GET /test_json_plex -> the same table, read from the local fixture.
pub async fn test_json_plex(
    _user: AuthUser,
    State(state): State<ColgadosState>,
) -> Result<impl IntoResponse, ColgadosError> {
    let path = &state.config.plex_fixture_path;
    let body = tokio::fs::read(path).await?;
    let table = PlexResponse::from_slice(&body)?.into_first_table()?;
    info!(path = %path.display(), rows = table.rows.len(), "PLEX fixture loaded");
    render_plex_table("test_json_plex.html", &table)
}

/// GET /test_json_plex_sharepoint -> JSON document stored in SharePoint.
pub async fn test_json_plex_sharepoint(
    _user: AuthUser,
    State(state): State<ColgadosState>,
) -> Result<impl IntoResponse, ColgadosError> {
    let body = state
        .sharepoint
        .download(&state.config.sharepoint_file_path)
        .await?;
    let table = DataTable::from_slice(&body)?;
    info!(
        rows = table.len(),
        columns = table.columns.len(),
        "SharePoint table loaded"
    );

    let mut ctx = page_context(true, &[]);
    ctx.insert("data", &table.to_html());
    ctx.insert("table", &table);
    render("test_json_plex_sharepoint.html", &ctx)
}
