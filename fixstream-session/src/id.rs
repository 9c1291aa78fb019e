/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session identifier.

use serde::{Deserialize, Serialize};

/// Identity of one FIX session as declared in the engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId {
    /// BeginString (FIX version).
    pub begin_string: String,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
    /// Optional sender sub ID.
    pub sender_sub_id: Option<String>,
    /// Optional target sub ID.
    pub target_sub_id: Option<String>,
    /// Optional qualifier distinguishing otherwise identical sessions.
    pub qualifier: Option<String>,
}

impl SessionId {
    /// Creates a new session ID.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            sender_sub_id: None,
            target_sub_id: None,
            qualifier: None,
        }
    }

    /// Sets the sender sub ID.
    #[must_use]
    pub fn with_sender_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the target sub ID.
    #[must_use]
    pub fn with_target_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.target_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the session qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Returns true if this session runs over FIXT (FIX 5.0 and later).
    #[must_use]
    pub fn is_fixt(&self) -> bool {
        self.begin_string.starts_with("FIXT")
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.begin_string, self.sender_comp_id)?;
        if let Some(sub) = &self.sender_sub_id {
            write!(f, "/{sub}")?;
        }
        write!(f, "->{}", self.target_comp_id)?;
        if let Some(sub) = &self.target_sub_id {
            write!(f, "/{sub}")?;
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, ":{qualifier}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("FIX.4.4", "SENDER", "TARGET");
        assert_eq!(id.to_string(), "FIX.4.4:SENDER->TARGET");
        assert!(!id.is_fixt());
    }

    #[test]
    fn test_session_id_display_with_optional_parts() {
        let id = SessionId::new("FIXT.1.1", "SENDER", "TARGET")
            .with_sender_sub_id("DESK")
            .with_target_sub_id("GW")
            .with_qualifier("MD");
        assert_eq!(id.to_string(), "FIXT.1.1:SENDER/DESK->TARGET/GW:MD");
        assert!(id.is_fixt());
    }

    #[test]
    fn test_qualifier_distinguishes_sessions() {
        let a = SessionId::new("FIX.4.4", "S", "T");
        let b = SessionId::new("FIX.4.4", "S", "T").with_qualifier("2");
        assert_ne!(a, b);
    }
}
