//! Who is signed in and what they may do.
//!
//! Admin-only operations take an [`AdminCapability`], which can only be
//! obtained from a [`SessionContext`] whose role is [`Role::Admin`].

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::AuthorizationError;

/// Authenticated user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub id: String,
	pub email: String,
}

impl Identity {
	#[must_use]
	pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			email: email.into(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Anonymous,
	Reader,
	Admin,
}

/// Emails allowed to moderate, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminPolicy {
	emails: Vec<String>,
}

impl AdminPolicy {
	#[must_use]
	pub fn new<I, S>(emails: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut normalized: Vec<String> = Vec::new();
		for email in emails {
			let email = email.as_ref().trim().to_lowercase();
			if !email.is_empty() && !normalized.contains(&email) {
				normalized.push(email);
			}
		}
		Self { emails: normalized }
	}

	#[must_use]
	pub fn emails(&self) -> &[String] {
		&self.emails
	}

	#[must_use]
	pub fn allows(&self, email: &str) -> bool {
		let email = email.trim().to_lowercase();
		self.emails.iter().any(|allowed| *allowed == email)
	}
}

/// Proof that the current session may moderate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCapability {
	email: String,
}

impl AdminCapability {
	#[must_use]
	pub fn email(&self) -> &str {
		&self.email
	}
}

/// The signed-in identity and the role derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
	identity: Option<Identity>,
	role: Role,
}

impl SessionContext {
	#[must_use]
	pub fn anonymous() -> Self {
		Self {
			identity: None,
			role: Role::Anonymous,
		}
	}

	#[must_use]
	pub fn resolve(identity: Option<Identity>, policy: &AdminPolicy) -> Self {
		let role = match &identity {
			None => Role::Anonymous,
			Some(identity) if policy.allows(&identity.email) => Role::Admin,
			Some(_) => Role::Reader,
		};
		debug!("session resolved as {role:?}");
		Self { identity, role }
	}

	#[must_use]
	pub fn identity(&self) -> Option<&Identity> {
		self.identity.as_ref()
	}

	#[must_use]
	pub fn role(&self) -> Role {
		self.role
	}

	/// Whether moderation controls should be shown at all.
	#[must_use]
	pub fn can_moderate(&self) -> bool {
		self.role == Role::Admin
	}

	pub fn require_admin(&self) -> Result<AdminCapability, AuthorizationError> {
		match (&self.identity, self.role) {
			(Some(identity), Role::Admin) => Ok(AdminCapability {
				email: identity.email.clone(),
			}),
			(Some(identity), _) => Err(AuthorizationError::NotAdmin {
				email: identity.email.clone(),
			}),
			(None, _) => Err(AuthorizationError::NotSignedIn),
		}
	}
}

impl Default for SessionContext {
	fn default() -> Self {
		Self::anonymous()
	}
}
