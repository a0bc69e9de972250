#![forbid(unsafe_code)]

pub mod forest;
pub mod keys;
pub mod paths;

pub const ROOT_NAME: &str = "root";
pub const ARCHIVE_NAME: &str = "archive";

pub mod ids {
    const SYSTEM_PREFIX: &str = "sys:";

    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct OwnerId(String);

    impl OwnerId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
            let value = value.into();
            validate_owner_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum OwnerIdError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    impl OwnerIdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "owner id must not be empty",
                Self::TooLong => "owner id is too long",
                Self::InvalidFirstChar => "owner id must start with an ascii letter or digit",
                Self::InvalidChar { .. } => "owner id contains an unsupported character",
            }
        }
    }

    fn validate_owner_id(value: &str) -> Result<(), OwnerIdError> {
        if value.is_empty() {
            return Err(OwnerIdError::Empty);
        }
        if value.len() > 128 {
            return Err(OwnerIdError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(OwnerIdError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(OwnerIdError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate().skip(1) {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                continue;
            }
            return Err(OwnerIdError::InvalidChar { ch, index });
        }
        Ok(())
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum SystemProject {
        Root,
        Archive,
    }

    impl SystemProject {
        pub fn name(self) -> &'static str {
            match self {
                Self::Root => crate::ROOT_NAME,
                Self::Archive => crate::ARCHIVE_NAME,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ProjectId(String);

    impl ProjectId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, ProjectIdError> {
            let value = value.into();
            validate_project_id(&value)?;
            Ok(Self(value))
        }

        /// Reserved id of an owner's root or archive; user ids can never collide with it.
        pub fn system(owner: &OwnerId, kind: SystemProject) -> Self {
            Self(format!("{SYSTEM_PREFIX}{}:{}", owner.as_str(), kind.name()))
        }

        pub fn is_system(&self) -> bool {
            self.0.starts_with(SYSTEM_PREFIX)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ProjectIdError {
        Empty,
        TooLong,
        ContainsControl,
        ReservedPrefix,
    }

    impl ProjectIdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "project id must not be empty",
                Self::TooLong => "project id is too long",
                Self::ContainsControl => "project id contains control characters",
                Self::ReservedPrefix => "project id must not use the reserved 'sys:' prefix",
            }
        }
    }

    fn validate_project_id(value: &str) -> Result<(), ProjectIdError> {
        if value.trim().is_empty() {
            return Err(ProjectIdError::Empty);
        }
        if value.len() > 256 {
            return Err(ProjectIdError::TooLong);
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(ProjectIdError::ContainsControl);
        }
        if value.starts_with(SYSTEM_PREFIX) {
            return Err(ProjectIdError::ReservedPrefix);
        }
        Ok(())
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ProjectName(String);

    impl ProjectName {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        /// Names are trimmed; `/` is rejected because it separates path segments.
        pub fn try_new(value: impl Into<String>) -> Result<Self, ProjectNameError> {
            let value = value.into();
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(ProjectNameError::Empty);
            }
            if trimmed.chars().count() > 200 {
                return Err(ProjectNameError::TooLong);
            }
            if trimmed.contains('/') {
                return Err(ProjectNameError::ContainsSlash);
            }
            if trimmed.chars().any(|c| c.is_control()) {
                return Err(ProjectNameError::ContainsControl);
            }
            Ok(Self(trimmed.to_string()))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ProjectNameError {
        Empty,
        TooLong,
        ContainsSlash,
        ContainsControl,
    }

    impl ProjectNameError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "project name must not be empty",
                Self::TooLong => "project name is too long",
                Self::ContainsSlash => "project name must not contain '/'",
                Self::ContainsControl => "project name contains control characters",
            }
        }
    }
}
