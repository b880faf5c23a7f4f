use crate::utils::AppError;
use mongodb::bson::oid::ObjectId;
use std::fmt;
use std::str::FromStr;

/// A validated 24 character MongoDB ObjectId.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        DocumentId(oid)
    }
}

impl FromStr for DocumentId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != 24 {
            return Err(AppError::invalid("Invalid Id, Object IDs must be 24 characters"));
        }
        ObjectId::parse_str(s)
            .map(DocumentId)
            .map_err(|_| AppError::invalid("Invalid Id, Object IDs must be hexadecimal"))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}
