//! SharePoint Online file download with user credentials (STS token, then
//! `FedAuth` cookie).

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::ColgadosError;

const SIGN_IN_PATH: &str = "/_forms/default.aspx?wa=wsignin1.0";
const AUTH_COOKIE: &str = "FedAuth";

pub struct SharePointClient {
    http: reqwest::Client,
    cookies: Arc<Jar>,
    site_url: Url,
    sts_url: Url,
    username: String,
    password: String,
}

impl SharePointClient {
    pub fn new(cfg: &Config) -> Result<Self, ColgadosError> {
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .user_agent(concat!("colgados-web/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(cookies.clone())
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            cookies,
            site_url: cfg.sharepoint_site_url.clone(),
            sts_url: cfg.sharepoint_sts_url.clone(),
            username: cfg.sharepoint_user.clone(),
            password: cfg.sharepoint_pass.clone(),
        })
    }

    /// Sign in and download a file by its server-relative URL.
    pub async fn download(&self, server_relative_url: &str) -> Result<Vec<u8>, ColgadosError> {
        self.sign_in().await?;
        let url = file_value_url(&self.site_url, server_relative_url)?;
        let resp = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.bytes().await?;
        info!(
            path = %server_relative_url,
            bytes = body.len(),
            "SharePoint file downloaded"
        );
        Ok(body.to_vec())
    }

    async fn sign_in(&self) -> Result<(), ColgadosError> {
        let sign_in_url = sign_in_url(&self.site_url)?;
        let envelope = security_token_envelope(
            &self.username,
            &self.password,
            self.sts_url.as_str(),
            sign_in_url.as_str(),
        );

        let sts_body = self
            .http
            .post(self.sts_url.clone())
            .header(CONTENT_TYPE, "application/soap+xml; charset=utf-8")
            .body(envelope)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let token = extract_security_token(&sts_body)?;
        debug!("SharePoint security token issued");

        self.http
            .post(sign_in_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "*/*")
            .body(token)
            .send()
            .await?
            .error_for_status()?;

        let has_auth_cookie = self
            .cookies
            .cookies(&self.site_url)
            .and_then(|v| v.to_str().map(|s| s.contains(AUTH_COOKIE)).ok())
            .unwrap_or(false);
        if !has_auth_cookie {
            return Err(ColgadosError::SharePointAuth(
                "sign-in did not set the FedAuth cookie".to_string(),
            ));
        }
        Ok(())
    }
}

fn sign_in_url(site_url: &Url) -> Result<Url, ColgadosError> {
    let origin = site_url.origin().ascii_serialization();
    Ok(Url::parse(&format!("{origin}{SIGN_IN_PATH}"))?)
}

/// `<site>/_api/web/GetFileByServerRelativeUrl('<path>')/$value`
fn file_value_url(site_url: &Url, server_relative_url: &str) -> Result<Url, ColgadosError> {
    let mut url = site_url.clone();
    let base = site_url.path().trim_end_matches('/');
    let escaped = server_relative_url.replace('\'', "''");
    url.set_path(&format!(
        "{base}/_api/web/GetFileByServerRelativeUrl('{escaped}')/$value"
    ));
    url.set_query(None);
    Ok(url)
}

fn security_token_envelope(username: &str, password: &str, sts: &str, applies_to: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing" xmlns:u="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Issue</a:Action>
    <a:ReplyTo><a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address></a:ReplyTo>
    <a:To s:mustUnderstand="1">{sts}</a:To>
    <o:Security s:mustUnderstand="1" xmlns:o="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd">
      <o:UsernameToken>
        <o:Username>{username}</o:Username>
        <o:Password>{password}</o:Password>
      </o:UsernameToken>
    </o:Security>
  </s:Header>
  <s:Body>
    <t:RequestSecurityToken xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">
      <wsp:AppliesTo xmlns:wsp="http://schemas.xmlsoap.org/ws/2004/09/policy">
        <a:EndpointReference><a:Address>{applies_to}</a:Address></a:EndpointReference>
      </wsp:AppliesTo>
      <t:KeyType>http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey</t:KeyType>
      <t:RequestType>http://schemas.xmlsoap.org/ws/2005/02/trust/Issue</t:RequestType>
      <t:TokenType>urn:oasis:names:tc:SAML:1.0:assertion</t:TokenType>
    </t:RequestSecurityToken>
  </s:Body>
</s:Envelope>"#,
        sts = escape(sts),
        username = escape(username),
        password = escape(password),
        applies_to = escape(applies_to),
    )
}

/// Text gathered from an STS reply, keyed by the element it appeared in.
#[derive(Default)]
struct StsReply {
    token: Option<String>,
    fault_detail: Option<String>,
    fault_reason: Option<String>,
}

impl StsReply {
    fn push(&mut self, path: &[Vec<u8>], text: &str) {
        let Some(current) = path.last() else { return };
        let parent = path.len().checked_sub(2).map(|i| path[i].as_slice());
        let slot = match (current.as_slice(), parent) {
            (b"BinarySecurityToken", _) => &mut self.token,
            (b"text", _) => &mut self.fault_detail,
            (b"Text", Some(b"Reason")) => &mut self.fault_reason,
            _ => return,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }
}

/// Pull the `BinarySecurityToken` out of an STS response, or the fault text.
fn extract_security_token(body: &str) -> Result<String, ColgadosError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut reply = StsReply::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => path.push(e.local_name().as_ref().to_vec()),
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| {
                    ColgadosError::SharePointAuth(format!("malformed STS response: {e}"))
                })?;
                reply.push(&path, &text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                reply.push(&path, &text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ColgadosError::SharePointAuth(format!(
                    "malformed STS response: {e}"
                )));
            }
        }
    }

    if let Some(token) = reply
        .token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
    {
        return Ok(token);
    }
    let reason = reply
        .fault_detail
        .or(reply.fault_reason)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "security token missing from STS response".to_string());
    Err(ColgadosError::SharePointAuth(reason))
}
