use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ColgadosError;
use crate::middleware::auth::AuthUser;
use crate::middleware::csrf::{issue_token, token_matches};
use crate::router::ColgadosState;
use crate::templates::{page_context, render};
use crate::types::forms::{
    ADD_FIELDS, AddForm, BAD_CSRF, EDIT_FIELDS, EditForm, FieldErrors, errors_for_template,
};

pub const LIST_PATH: &str = "/lista_de_colgados";

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

pub async fn lista_de_colgados(
    _user: AuthUser,
    State(state): State<ColgadosState>,
) -> Result<impl IntoResponse, ColgadosError> {
    let colgados = state.storage.list_colgados().await?;
    let mut ctx = page_context(true, &[]);
    ctx.insert("colgados", &colgados);
    render("lista_de_colgados.html", &ctx)
}

pub async fn atributos_lineas(_user: AuthUser) -> Result<impl IntoResponse, ColgadosError> {
    render("atributos_lineas.html", &page_context(true, &[]))
}

fn add_form_page(
    state: &ColgadosState,
    jar: PrivateCookieJar,
    form: &AddForm,
    errors: FieldErrors,
    csrf_error: Option<&str>,
) -> Result<Response, ColgadosError> {
    let (jar, token) = issue_token(jar, state.secure_cookies());
    let mut ctx = page_context(true, &[]);
    ctx.insert("form", form);
    ctx.insert("errors", &errors_for_template(ADD_FIELDS, errors));
    ctx.insert("csrf_token", &token);
    ctx.insert("csrf_error", &csrf_error);
    let page = render("add.html", &ctx)?;
    Ok((jar, page).into_response())
}

pub async fn add_page(
    _user: AuthUser,
    State(state): State<ColgadosState>,
    jar: PrivateCookieJar,
) -> Result<Response, ColgadosError> {
    add_form_page(&state, jar, &AddForm::default(), FieldErrors::new(), None)
}

/// POST /add -> store a new Colgado, or show the form again with errors.
pub async fn add(
    _user: AuthUser,
    State(state): State<ColgadosState>,
    jar: PrivateCookieJar,
    Form(form): Form<AddForm>,
) -> Result<Response, ColgadosError> {
    if !token_matches(&jar, &form.csrf_token) {
        warn!("add form rejected: CSRF token mismatch");
        return add_form_page(&state, jar, &form, FieldErrors::new(), Some(BAD_CSRF));
    }

    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => return add_form_page(&state, jar, &form, errors, None),
    };

    let colgado = state.storage.insert_colgado(new).await?;
    info!(colgado_id = colgado.id, part_no = %colgado.part_no, "colgado added");
    Ok(Redirect::to(LIST_PATH).into_response())
}

fn edit_form_page(
    colgado: &crate::db::Colgado,
    form: &EditForm,
    errors: FieldErrors,
) -> Result<Response, ColgadosError> {
    let mut ctx = page_context(true, &[]);
    ctx.insert("colgado", colgado);
    ctx.insert("form", form);
    ctx.insert("errors", &errors_for_template(EDIT_FIELDS, errors));
    Ok(render("edit.html", &ctx)?.into_response())
}

/// GET /edit?id=N -> form pre-filled with the stored values.
pub async fn edit_page(
    _user: AuthUser,
    State(state): State<ColgadosState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ColgadosError> {
    let colgado = state
        .storage
        .get_colgado(query.id)
        .await?
        .ok_or_else(|| ColgadosError::NotFound(format!("colgado {}", query.id)))?;
    let form = EditForm {
        id: colgado.id,
        pieza_rack: colgado.pieza_rack.to_string(),
        rack_eslabon: colgado.rack_eslabon.to_string(),
    };
    edit_form_page(&colgado, &form, FieldErrors::new())
}

/// POST /edit -> update the rack counts of the Colgado named by the form `id`.
pub async fn edit(
    _user: AuthUser,
    State(state): State<ColgadosState>,
    Form(form): Form<EditForm>,
) -> Result<Response, ColgadosError> {
    let counts = match form.validate() {
        Ok(counts) => counts,
        Err(errors) => {
            let colgado = state
                .storage
                .get_colgado(form.id)
                .await?
                .ok_or_else(|| ColgadosError::NotFound(format!("colgado {}", form.id)))?;
            return edit_form_page(&colgado, &form, errors);
        }
    };

    if !state.storage.update_rack_counts(form.id, counts).await? {
        return Err(ColgadosError::NotFound(format!("colgado {}", form.id)));
    }
    info!(
        colgado_id = form.id,
        pieza_rack = counts.pieza_rack,
        rack_eslabon = counts.rack_eslabon,
        "colgado updated"
    );
    Ok(Redirect::to(LIST_PATH).into_response())
}

/// GET /delete?id=N -> remove the record; unknown ids leave everything as is.
pub async fn delete(
    _user: AuthUser,
    State(state): State<ColgadosState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ColgadosError> {
    if state.storage.delete_colgado(query.id).await? {
        info!(colgado_id = query.id, "colgado deleted");
    } else {
        warn!(colgado_id = query.id, "delete requested for unknown colgado");
    }
    Ok(Redirect::to(LIST_PATH).into_response())
}
