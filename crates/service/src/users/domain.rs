use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::domain::Role;
use crate::validation::{is_email, mandatory, replace_if_some, CopyNonNull, Validate, Violation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    pub name: String,
    pub phone: String,
    pub birthday: NaiveDate,
}

/// Stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub login: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_blocked: bool,
    pub personal_data: PersonalData,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// JSON view; personal data only when `with_personal_data`.
    pub fn view(&self, with_personal_data: bool) -> UserView {
        UserView {
            login: self.login.clone(),
            email: self.email.clone(),
            role: self.role,
            is_blocked: self.is_blocked,
            personal_data: with_personal_data.then(|| self.personal_data.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub login: String,
    pub email: String,
    pub role: Role,
    pub is_blocked: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub personal_data: Option<PersonalData>,
}

/// Create / patch payload. Personal data fields are flat in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub login: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_blocked: Option<bool>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl From<&User> for UserDraft {
    /// The password is never copied back; only the hash is stored.
    fn from(u: &User) -> Self {
        Self {
            login: Some(u.login.clone()),
            email: Some(u.email.clone()),
            password: None,
            role: Some(u.role),
            is_blocked: Some(u.is_blocked),
            name: Some(u.personal_data.name.clone()),
            phone: Some(u.personal_data.phone.clone()),
            birthday: Some(u.personal_data.birthday),
        }
    }
}

impl CopyNonNull for UserDraft {
    fn copy_non_null(&mut self, patch: Self) {
        replace_if_some(&mut self.login, patch.login);
        replace_if_some(&mut self.email, patch.email);
        replace_if_some(&mut self.password, patch.password);
        replace_if_some(&mut self.role, patch.role);
        replace_if_some(&mut self.is_blocked, patch.is_blocked);
        replace_if_some(&mut self.name, patch.name);
        replace_if_some(&mut self.phone, patch.phone);
        replace_if_some(&mut self.birthday, patch.birthday);
    }
}

impl Validate for UserDraft {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        mandatory(&mut out, "login", &self.login, "Login is mandatory");
        mandatory(&mut out, "email", &self.email, "Email is mandatory");
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !is_email(email) {
                out.push(Violation { field: "email", message: "Email is invalid" });
            }
        }
        mandatory(&mut out, "password", &self.password, "Password is mandatory");
        mandatory(&mut out, "name", &self.name, "Name is mandatory");
        mandatory(&mut out, "phone", &self.phone, "Phone is mandatory");
        if self.birthday.is_none() {
            out.push(Violation { field: "birthday", message: "Birthday is mandatory" });
        }
        out
    }
}
