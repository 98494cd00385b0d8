use crate::dns_message::Question;
use crate::dns_name::DomainName;
use crate::dns_record::{RecordClass, RecordType};
use crate::errors::DomainError;

/// What to ask: name, type, class and whether recursion is wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    name: DomainName,
    record_type: RecordType,
    record_class: RecordClass,
    recursion_desired: bool,
}

impl Query {
    pub fn new(name: &str, record_type: RecordType) -> Result<Self, DomainError> {
        Ok(Self::for_name(DomainName::parse(name)?, record_type))
    }

    pub fn for_name(name: DomainName, record_type: RecordType) -> Self {
        Self {
            name: name.to_lowercase(),
            record_type,
            record_class: RecordClass::IN,
            recursion_desired: true,
        }
    }

    pub fn with_class(mut self, record_class: RecordClass) -> Self {
        self.record_class = record_class;
        self
    }

    pub fn without_recursion(mut self) -> Self {
        self.recursion_desired = false;
        self
    }

    /// Same type, class and flags, asked about another name.
    pub fn retarget(&self, name: &DomainName) -> Self {
        Self {
            name: name.to_lowercase(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn record_class(&self) -> RecordClass {
        self.record_class
    }

    pub fn recursion_desired(&self) -> bool {
        self.recursion_desired
    }

    pub fn question(&self) -> Question {
        Question {
            name: self.name.clone(),
            record_type: self.record_type,
            record_class: self.record_class,
        }
    }
}
