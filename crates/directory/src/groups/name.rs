use std::fmt;

/// Longest display name the portal accepts, in characters.
pub const MAX_GROUP_NAME_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupNameError {
    #[error("Please enter a group name")]
    Empty,
    #[error("Group name must be between 1 and 64 characters")]
    TooLong { length: usize },
}

/// A trimmed, length-checked group display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupName(String);

impl GroupName {
    pub fn parse(raw: &str) -> Result<Self, GroupNameError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();

        if length == 0 {
            return Err(GroupNameError::Empty);
        }

        if length > MAX_GROUP_NAME_LENGTH {
            return Err(GroupNameError::TooLong { length });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mail_nickname(&self) -> String {
        mail_nickname(&self.0)
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The display name with spaces removed, lowercased.
pub fn mail_nickname(display_name: &str) -> String {
    display_name.replace(' ', "").to_lowercase()
}
