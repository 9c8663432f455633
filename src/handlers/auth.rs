use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::info;

use crate::error::ColgadosError;
use crate::middleware::auth::{self as session, AuthUser, LOGIN_PATH, MaybeUser};
use crate::middleware::flash::{flash, take_flashes};
use crate::router::ColgadosState;
use crate::templates::{page_context, render};
use crate::types::forms::{LoginForm, RegisterForm};

pub const LANDING_PATH: &str = "/secrets";

pub const EMAIL_TAKEN: &str = "Este correo ya esta registrado, para ingresar inicie sesion";
pub const UNKNOWN_EMAIL: &str =
    "El correo proporcionado no esta registrado, intente de nuevo o registrese.";
pub const WRONG_PASSWORD: &str =
    "La contraseña ingresada no es correcta, intente de nuevo por favor.";
pub const MISSING_FIELDS: &str = "Todos los campos son obligatorios.";

/// GET / -> landing page, or the login page for anonymous callers.
pub async fn home(user: MaybeUser) -> Result<Response, ColgadosError> {
    if !user.is_authenticated() {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }
    Ok(render("index.html", &page_context(true, &[]))?.into_response())
}

pub async fn register_page(
    user: MaybeUser,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, ColgadosError> {
    let (jar, flashes) = take_flashes(jar);
    let page = render(
        "register.html",
        &page_context(user.is_authenticated(), &flashes),
    )?;
    Ok((jar, page))
}

/// POST /register -> create the account and log it in.
pub async fn register(
    State(state): State<ColgadosState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ColgadosError> {
    let secure = state.secure_cookies();
    let Some(form) = form.normalized() else {
        let jar = flash(jar, MISSING_FIELDS, secure);
        return Ok((jar, Redirect::to("/register")).into_response());
    };

    if state.storage.find_user_by_email(&form.email).await?.is_some() {
        info!(email = %form.email, "registration for an existing email");
        let jar = flash(jar, EMAIL_TAKEN, secure);
        return Ok((jar, Redirect::to(LOGIN_PATH)).into_response());
    }

    let hasher = state.hasher;
    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await?;

    let Some(user) = state
        .storage
        .create_user(&form.email, &password_hash, &form.name)
        .await?
    else {
        let jar = flash(jar, EMAIL_TAKEN, secure);
        return Ok((jar, Redirect::to(LOGIN_PATH)).into_response());
    };

    info!(user_id = user.id, "user registered");
    let jar = session::login(jar, user.id, secure);
    Ok((jar, Redirect::to(LANDING_PATH)).into_response())
}

pub async fn login_page(
    user: MaybeUser,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, ColgadosError> {
    let (jar, flashes) = take_flashes(jar);
    let page = render("login.html", &page_context(user.is_authenticated(), &flashes))?;
    Ok((jar, page))
}

/// POST /login -> establish the session when the password matches.
pub async fn login(
    State(state): State<ColgadosState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ColgadosError> {
    let secure = state.secure_cookies();
    let email = form.email.trim();

    let Some(user) = state.storage.find_user_by_email(email).await? else {
        let jar = flash(jar, UNKNOWN_EMAIL, secure);
        return Ok((jar, Redirect::to(LOGIN_PATH)).into_response());
    };

    let hasher = state.hasher;
    let password = form.password;
    let stored = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored)).await?;
    if !matches {
        info!(user_id = user.id, "login rejected: wrong password");
        let jar = flash(jar, WRONG_PASSWORD, secure);
        return Ok((jar, Redirect::to(LOGIN_PATH)).into_response());
    }

    info!(user_id = user.id, "user logged in");
    let jar = session::login(jar, user.id, secure);
    Ok((jar, Redirect::to(LANDING_PATH)).into_response())
}

pub async fn logout(AuthUser(user): AuthUser, jar: PrivateCookieJar) -> impl IntoResponse {
    info!(user_id = user.id, "user logged out");
    (session::logout(jar), Redirect::to(LOGIN_PATH))
}

pub async fn secrets(AuthUser(user): AuthUser) -> Result<impl IntoResponse, ColgadosError> {
    let mut ctx = page_context(true, &[]);
    ctx.insert("name", &user.name);
    render("secrets.html", &ctx)
}
