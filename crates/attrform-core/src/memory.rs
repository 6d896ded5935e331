//! In-memory [`Host`] implementation
//!
//! Keeps raw attribute documents, one table of records per relation, and the
//! link rows tying the owner to those records. Every attach and detach is
//! appended to a journal so callers can see exactly which link operations a
//! save cycle issued.

use crate::error::HostError;
use crate::host::{Host, HostResult};
use crate::relation::{RelationConfig, RelationKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One link between the owner and a related record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRow {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Records of one relation and the owner's links to them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedTable {
    pub key_field: String,
    pub records: Vec<Value>,
    pub links: Vec<LinkRow>,
}

impl Default for RelatedTable {
    fn default() -> Self {
        Self {
            key_field: "id".to_string(),
            records: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl RelatedTable {
    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    fn position(&self, key_field: &str, key: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| key_string(record.get(key_field)).as_deref() == Some(key))
    }

    pub fn find(&self, key: &str) -> Option<&Value> {
        self.position(&self.key_field, key).map(|index| &self.records[index])
    }

    pub fn linked_keys(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.key.as_str()).collect()
    }

    /// Records behind the link rows, in link order
    pub fn linked_records(&self) -> Vec<Value> {
        self.links
            .iter()
            .filter_map(|link| self.find(&link.key).cloned())
            .collect()
    }

    fn next_key(&self, key_field: &str) -> String {
        let max = self
            .records
            .iter()
            .filter_map(|record| key_string(record.get(key_field)))
            .filter_map(|key| key.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

fn key_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(key) => Some(key.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Link operation recorded by [`MemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LinkOperation {
    Attach {
        relation: String,
        key: String,
        path: Option<String>,
    },
    Detach {
        relation: String,
        key: String,
    },
}

/// Serializable snapshot of a [`MemoryHost`] with decoded attribute documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryFixture {
    pub owner_key: String,
    pub exists: bool,
    pub attributes: IndexMap<String, Value>,
    pub relations: IndexMap<String, RelatedTable>,
}

impl Default for MemoryFixture {
    fn default() -> Self {
        Self {
            owner_key: "1".to_string(),
            exists: false,
            attributes: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHost {
    owner_key: String,
    exists: bool,
    attributes: IndexMap<String, String>,
    relations: IndexMap<String, RelatedTable>,
    loaded: IndexMap<String, Vec<Value>>,
    journal: Vec<LinkOperation>,
    persist_count: usize,
    fail_persist: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::from_fixture(MemoryFixture::default())
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: MemoryFixture) -> Self {
        let attributes = fixture
            .attributes
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        Self {
            owner_key: fixture.owner_key,
            exists: fixture.exists,
            attributes,
            relations: fixture.relations,
            loaded: IndexMap::new(),
            journal: Vec::new(),
            persist_count: 0,
            fail_persist: false,
        }
    }

    /// Snapshot with attribute documents decoded; undecodable documents become strings
    pub fn to_fixture(&self) -> MemoryFixture {
        let attributes = self
            .attributes
            .iter()
            .map(|(name, raw)| {
                let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
                (name.clone(), value)
            })
            .collect();
        MemoryFixture {
            owner_key: self.owner_key.clone(),
            exists: self.exists,
            attributes,
            relations: self.relations.clone(),
        }
    }

    /// Mark the record as already persisted
    pub fn persisted(mut self) -> Self {
        self.exists = true;
        self
    }

    pub fn with_records(mut self, relation: impl Into<String>, records: Vec<Value>) -> Self {
        self.relations
            .entry(relation.into())
            .or_default()
            .records
            .extend(records);
        self
    }

    pub fn with_links<I, S>(mut self, relation: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = self.relations.entry(relation.into()).or_default();
        table
            .links
            .extend(keys.into_iter().map(|key| LinkRow { key: key.into(), path: None }));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: &Value) -> Self {
        self.attributes.insert(name.into(), value.to_string());
        self
    }

    pub fn set_fail_persist(&mut self, fail: bool) {
        self.fail_persist = fail;
    }

    pub fn journal(&self) -> &[LinkOperation] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn persist_count(&self) -> usize {
        self.persist_count
    }

    pub fn table(&self, relation: &str) -> Option<&RelatedTable> {
        self.relations.get(relation)
    }

    pub fn linked_keys(&self, relation: &str) -> Vec<&str> {
        self.table(relation).map(RelatedTable::linked_keys).unwrap_or_default()
    }

    /// Decoded attribute document
    pub fn attribute_value(&self, name: &str) -> Option<Value> {
        self.attributes
            .get(name)
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    fn table_mut(&mut self, relation: &str) -> HostResult<&mut RelatedTable> {
        self.relations
            .get_mut(relation)
            .ok_or_else(|| HostError::UnknownRelation {
                relation: relation.to_string(),
            })
    }

    fn refresh_loaded(&mut self, relation: &str) {
        if !self.loaded.contains_key(relation) {
            return;
        }
        if let Some(table) = self.relations.get(relation) {
            let records = table.linked_records();
            self.loaded.insert(relation.to_string(), records);
        }
    }
}

impl Host for MemoryHost {
    fn exists(&self) -> bool {
        self.exists
    }

    fn raw_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_raw_attribute(&mut self, name: &str, raw: String) {
        self.attributes.insert(name.to_string(), raw);
    }

    fn persist(&mut self) -> HostResult<()> {
        if self.fail_persist {
            return Err(HostError::Storage("persist failure injected".to_string()));
        }
        self.exists = true;
        self.persist_count += 1;
        Ok(())
    }

    fn relation_loaded(&self, relation: &str) -> bool {
        self.loaded.contains_key(relation)
    }

    fn loaded_relation(&self, relation: &str) -> Option<&[Value]> {
        self.loaded.get(relation).map(Vec::as_slice)
    }

    fn load_relation(&mut self, relation: &str) -> HostResult<()> {
        let table = self
            .relations
            .get(relation)
            .ok_or_else(|| HostError::UnknownRelation {
                relation: relation.to_string(),
            })?;
        let records = table.linked_records();
        self.loaded.insert(relation.to_string(), records);
        Ok(())
    }

    fn find_related(&self, relation: &str, key: &str) -> HostResult<Option<Value>> {
        let table = self
            .relations
            .get(relation)
            .ok_or_else(|| HostError::UnknownRelation {
                relation: relation.to_string(),
            })?;
        Ok(table.find(key).cloned())
    }

    fn create_related(&mut self, config: &RelationConfig, object: &Value) -> HostResult<Value> {
        let table = self.table_mut(&config.relation)?;
        let key = table.next_key(&config.key_field);
        let mut record = match object {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        record.insert(config.key_field.clone(), Value::String(key));
        let record = Value::Object(record);
        table.records.push(record.clone());
        Ok(record)
    }

    fn update_related(&mut self, config: &RelationConfig, object: &Value) -> HostResult<()> {
        let key = key_string(object.get(&config.key_field)).unwrap_or_default();
        let table = self.table_mut(&config.relation)?;
        let index = table
            .position(&config.key_field, &key)
            .ok_or_else(|| HostError::NotFound {
                relation: config.relation.clone(),
                key: key.clone(),
            })?;
        if let (Value::Object(record), Value::Object(changes)) = (&mut table.records[index], object) {
            for (field, value) in changes {
                record.insert(field.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn attach(&mut self, config: &RelationConfig, key: &str, path: Option<&str>) -> HostResult<()> {
        let owner_key = self.owner_key.clone();
        let table = self.table_mut(&config.relation)?;
        let index = table
            .position(&config.key_field, key)
            .ok_or_else(|| HostError::NotFound {
                relation: config.relation.clone(),
                key: key.to_string(),
            })?;

        if let RelationKind::HasMany { foreign_key } = &config.kind {
            if let Value::Object(record) = &mut table.records[index] {
                record.insert(foreign_key.clone(), Value::String(owner_key));
            }
        }
        if !table.links.iter().any(|link| link.key == key) {
            table.links.push(LinkRow {
                key: key.to_string(),
                path: config.path_column().and(path).map(str::to_string),
            });
        }

        self.journal.push(LinkOperation::Attach {
            relation: config.relation.clone(),
            key: key.to_string(),
            path: path.map(str::to_string),
        });
        self.refresh_loaded(&config.relation);
        Ok(())
    }

    fn detach(&mut self, config: &RelationConfig, key: &str) -> HostResult<()> {
        let table = self.table_mut(&config.relation)?;
        let index = table
            .position(&config.key_field, key)
            .ok_or_else(|| HostError::NotFound {
                relation: config.relation.clone(),
                key: key.to_string(),
            })?;
        table.links.retain(|link| link.key != key);

        if let RelationKind::HasMany { foreign_key } = &config.kind {
            if let Value::Object(record) = &mut table.records[index] {
                record.insert(foreign_key.clone(), Value::Null);
            }
        }

        self.journal.push(LinkOperation::Detach {
            relation: config.relation.clone(),
            key: key.to_string(),
        });
        self.refresh_loaded(&config.relation);
        Ok(())
    }
}
