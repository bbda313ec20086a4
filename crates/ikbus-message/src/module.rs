use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{MessageError, Result};

/// A bus participant, e.g. `{ "id": 80, "code": "MFL", "name": "Multi-function steering wheel" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Bus address.
    pub id: u8,
    /// Short mnemonic.
    pub code: String,
    /// Full name.
    pub name: String,
}

impl ModuleDescriptor {
    /// Describe the module at bus address `id`.
    pub fn new(id: u8, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Address-keyed lookup of module descriptors. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTable {
    modules: BTreeMap<u8, ModuleDescriptor>,
}

impl ModuleTable {
    /// An empty table: no address is recognized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from descriptors. Addresses must be unique.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        let mut modules = BTreeMap::new();
        for descriptor in descriptors {
            let id = descriptor.id;
            if modules.insert(id, descriptor).is_some() {
                return Err(MessageError::DuplicateModule(id));
            }
        }
        Ok(Self { modules })
    }

    /// Load from a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<ModuleDescriptor> = serde_json::from_str(json)?;
        Self::from_descriptors(descriptors)
    }

    /// Load from a reader producing a JSON array of descriptors.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let descriptors: Vec<ModuleDescriptor> = serde_json::from_reader(reader)?;
        Self::from_descriptors(descriptors)
    }

    /// Descriptor for the module at `id`.
    pub fn descriptor(&self, id: u8) -> Option<&ModuleDescriptor> {
        self.modules.get(&id)
    }

    /// Short code of the module at `id`, e.g. `RAD`.
    pub fn code(&self, id: u8) -> Option<&str> {
        self.descriptor(id).map(|module| module.code.as_str())
    }

    /// Full name of the module at `id`.
    pub fn name(&self, id: u8) -> Option<&str> {
        self.descriptor(id).map(|module| module.name.as_str())
    }

    /// Whether `id` belongs to a known module.
    pub fn is_recognized(&self, id: u8) -> bool {
        self.modules.contains_key(&id)
    }

    /// Number of known modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no modules are known.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Descriptors in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"[
        { "id": 80, "code": "MFL", "name": "Multi-function steering wheel" },
        { "id": 104, "code": "RAD", "name": "Radio" },
        { "id": 255, "code": "LOC", "name": "Broadcast" }
    ]"#;

    #[test]
    fn lookup_by_address() {
        let table = ModuleTable::from_json(TABLE).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.code(0x50), Some("MFL"));
        assert_eq!(table.name(0x68), Some("Radio"));
        assert!(table.is_recognized(0xFF));
        assert!(!table.is_recognized(0x3F));
        assert_eq!(table.code(0x3F), None);
        assert_eq!(
            table.descriptor(0x68),
            Some(&ModuleDescriptor::new(0x68, "RAD", "Radio"))
        );
    }

    #[test]
    fn iterates_in_address_order() {
        let table = ModuleTable::from_descriptors([
            ModuleDescriptor::new(0xFF, "LOC", "Broadcast"),
            ModuleDescriptor::new(0x50, "MFL", "Steering wheel"),
        ])
        .unwrap();

        let ids: Vec<u8> = table.iter().map(|module| module.id).collect();
        assert_eq!(ids, [0x50, 0xFF]);
    }

    #[test]
    fn duplicate_address_rejected() {
        let err = ModuleTable::from_descriptors([
            ModuleDescriptor::new(0x68, "RAD", "Radio"),
            ModuleDescriptor::new(0x68, "RAD2", "Other radio"),
        ])
        .unwrap_err();

        assert!(matches!(err, MessageError::DuplicateModule(0x68)));
        assert_eq!(err.to_string(), "duplicate module address 0x68");
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            ModuleTable::from_json(r#"[{ "id": 300, "code": "X", "name": "Y" }]"#),
            Err(MessageError::Json(_))
        ));
        assert!(matches!(ModuleTable::from_json("{}"), Err(MessageError::Json(_))));
    }

    #[test]
    fn from_reader_matches_from_json() {
        let table = ModuleTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table, ModuleTable::from_json(TABLE).unwrap());
        assert!(ModuleTable::new().is_empty());
    }
}
