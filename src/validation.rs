use axum::extract::FromRequest;
use time::{macros::format_description, Date};
use uuid::Uuid;

use crate::{
    auth::services::is_valid_email,
    error::{AppError, AppResult, FieldError},
};

/// JSON body extractor whose rejection is a 400 validation error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Collects rule violations in declaration order.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, param: &str, value: &str, msg: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(param, msg));
        }
        self
    }

    pub fn email(&mut self, param: &str, value: &str, msg: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.errors.push(FieldError::new(param, msg));
        }
        self
    }

    pub fn min_len(&mut self, param: &str, value: &str, min: usize, msg: &str) -> &mut Self {
        if value.chars().count() < min {
            self.errors.push(FieldError::new(param, msg));
        }
        self
    }

    /// Parses an optional `YYYY-MM-DD` date; blank input yields `None`.
    pub fn date(&mut self, param: &str, value: Option<&str>, msg: &str) -> Option<Date> {
        let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
        match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                self.errors.push(FieldError::new(param, msg));
                None
            }
        }
    }

    pub fn finish(&mut self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}

/// Path ids that do not parse are indistinguishable from missing ones.
pub fn parse_id(raw: &str, not_found: &'static str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(not_found))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation_in_order() {
        let mut v = Validator::new();
        v.required("name", "  ", "Name is required")
            .email("email", "nope", "Please include a valid email")
            .min_len("password", "abc", 6, "Password must have a minimum of 6 characters");
        match v.finish() {
            Err(AppError::Validation(errors)) => {
                let params: Vec<_> = errors.iter().filter_map(|e| e.param.as_deref()).collect();
                assert_eq!(params, ["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn passes_when_all_rules_hold() {
        let mut v = Validator::new();
        v.required("name", "A", "Name is required")
            .email("email", "a@x.com", "Please include a valid email")
            .min_len("password", "secret1", 6, "too short");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn date_rule() {
        let mut v = Validator::new();
        assert_eq!(
            v.date("from", Some("2019-03-01"), "bad"),
            Some(time::macros::date!(2019 - 03 - 01))
        );
        assert_eq!(v.date("to", Some(""), "bad"), None);
        assert_eq!(v.date("to", None, "bad"), None);
        assert!(v.finish().is_ok());

        assert_eq!(v.date("from", Some("03/01/2019"), "From date is invalid"), None);
        assert!(matches!(v.finish(), Err(AppError::Validation(e)) if e[0].msg == "From date is invalid"));
    }

    #[test]
    fn malformed_id_is_not_found() {
        assert!(matches!(
            parse_id("not-a-uuid", "Post not found"),
            Err(AppError::NotFound("Post not found"))
        ));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "x").unwrap(), id);
    }
}
