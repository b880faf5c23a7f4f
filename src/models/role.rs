use std::fmt;
use std::str::FromStr;

/// Closed set of user roles. Stored in the database as the upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Teacher,
    Student,
    Sensor,
}

/// Devices and teachers may push readings
pub const SENSOR_WRITERS: &[Role] = &[Role::Sensor, Role::Teacher];
/// Read-only access to readings
pub const READERS: &[Role] = &[Role::Teacher, Role::Student];
/// Administrative operations (users, corrections)
pub const ADMINS: &[Role] = &[Role::Teacher];

impl Role {
    /// Exact match against the stored upper-case name.
    pub fn from_stored(stored: &str) -> Option<Role> {
        [Role::Teacher, Role::Student, Role::Sensor]
            .into_iter()
            .find(|role| role.as_str() == stored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
            Role::Sensor => "SENSOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not an allowed role", self.0)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEACHER" => Ok(Role::Teacher),
            "STUDENT" => Ok(Role::Student),
            "SENSOR" => Ok(Role::Sensor),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// True when the stored role string is exactly a known role name and that role
/// is in `allowed`. Anything else never authorizes.
pub fn role_is_allowed(stored_role: &str, allowed: &[Role]) -> bool {
    Role::from_stored(stored_role).is_some_and(|role| allowed.contains(&role))
}
