use crate::{
    error::{AppResult, FieldErrors},
    models::{UserModel, WorkModel},
    services::Session,
    utils::{
        cookie::{build_clear_cookie, build_session_cookie},
        encode_session_token, jwt::session_config,
    },
};
use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot message shown after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Root,
    Works,
    Work(i32),
    Users,
    /// The referring page when it is a path on this site, otherwise the works list.
    Back,
}

impl Location {
    pub fn resolve(&self, referer: Option<&str>) -> String {
        match self {
            Location::Root => "/".to_string(),
            Location::Works => "/works".to_string(),
            Location::Work(id) => format!("/works/{id}"),
            Location::Users => "/users".to_string(),
            Location::Back => referer
                .filter(|r| is_local_path(r))
                .map(str::to_string)
                .unwrap_or_else(|| "/works".to_string()),
        }
    }
}

/// A path on this site. Absolute URLs and scheme-relative `//host` forms (including the
/// backslash variants browsers normalise to them) are not.
fn is_local_path(target: &str) -> bool {
    let mut chars = target.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/') | Some('\\'))
        && !target.chars().any(char::is_control)
}

/// The `Referer` as a path. An absolute URL naming this request's own `Host` is reduced to
/// its path and query; any other value is passed through for [`Location::resolve`] to vet.
fn local_referer(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let Ok(uri) = referer.parse::<Uri>() else {
        return Some(referer.to_string());
    };
    let Some(authority) = uri.authority() else {
        return Some(referer.to_string());
    };

    let host = headers.get(header::HOST).and_then(|value| value.to_str().ok())?;
    if authority.as_str().eq_ignore_ascii_case(host) {
        uri.path_and_query().map(|pq| pq.as_str().to_string())
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    NewWork,
    EditWork,
    Login,
}

/// Content for a successful render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Page {
    Home {
        categories: BTreeMap<String, Vec<WorkModel>>,
    },
    Works(Vec<WorkModel>),
    Work {
        work: WorkModel,
        voters: Vec<UserModel>,
    },
    EditWork(WorkModel),
    Users(Vec<UserModel>),
    User {
        user: UserModel,
        voted_works: Vec<WorkModel>,
    },
    CurrentUser(UserModel),
}

/// What the presentation layer should do with a finished action.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Render(Page),
    /// Show `form` again with per-field messages. `bad_request` marks a failed edit.
    RenderForm {
        form: Form,
        errors: FieldErrors,
        bad_request: bool,
    },
    Redirect {
        to: Location,
        flash: Flash,
    },
}

impl Intent {
    pub fn redirect(to: Location, flash: Flash) -> Self {
        Intent::Redirect { to, flash }
    }

    pub fn form(form: Form, errors: FieldErrors) -> Self {
        Intent::RenderForm {
            form,
            errors,
            bad_request: false,
        }
    }
}

/// An action's result: the session to carry forward plus the response intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub session: Session,
    pub intent: Intent,
}

impl Outcome {
    pub fn new(session: Session, intent: Intent) -> Self {
        Self { session, intent }
    }
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| anyhow::anyhow!("invalid header value: {e}").into())
}

/// Turn an [`Outcome`] into an HTTP response, writing the session cookie when the action
/// changed the session.
pub fn respond(before: Session, outcome: Outcome, headers: &HeaderMap) -> AppResult<Response> {
    let mut response = match outcome.intent {
        Intent::Render(page) => ApiResponse::ok(page).into_response(),
        Intent::RenderForm {
            form,
            errors,
            bad_request,
        } => {
            let status = if bad_request {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::OK
            };
            let body = json!({
                "success": errors.is_empty(),
                "form": form,
                "errors": errors,
            });
            (status, Json(body)).into_response()
        }
        Intent::Redirect { to, flash } => {
            let referer = local_referer(headers);
            let location = to.resolve(referer.as_deref());
            let body = json!({
                "success": flash.kind == FlashKind::Success,
                "redirect_to": location,
                "flash": flash,
            });
            let mut response = (StatusCode::SEE_OTHER, Json(body)).into_response();
            response
                .headers_mut()
                .insert(header::LOCATION, header_value(&location)?);
            response
        }
    };

    if outcome.session != before {
        let config = session_config()?;
        let cookie = match outcome.session.user_id {
            Some(user_id) => build_session_cookie(config, &encode_session_token(user_id)?),
            None => build_clear_cookie(config),
        };
        response
            .headers_mut()
            .append(header::SET_COOKIE, header_value(&cookie)?);
    }

    Ok(response)
}
