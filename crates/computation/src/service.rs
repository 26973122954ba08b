//! Catalog of structures and computations.
//!
//! [`Catalog`] is the request-handling core: it turns entities into envelope
//! documents, hands them to the storage gateway and turns stored documents
//! back into entities or projected rows.

use std::fmt;

use tracing::debug;

use crate::codec::{registry, CodecRegistry};
use crate::error::ServiceError;
use crate::model::{Computation, ComputationId, Document, Status, Structure, StructureId};
use crate::query::{self, FieldTable, ListQuery, COMPUTATION_FIELDS, STRUCTURE_FIELDS};
use crate::storage::{Database, COMPUTATIONS, STRUCTURES};

/// Structure and computation operations over a [`Database`].
pub struct Catalog<'a> {
    database: &'a Database,
    registry: &'a CodecRegistry,
}

impl<'a> Catalog<'a> {
    /// A catalog using the process-wide codec registry.
    pub fn new(database: &'a Database) -> Self {
        Self::with_registry(database, registry())
    }

    pub fn with_registry(database: &'a Database, registry: &'a CodecRegistry) -> Self {
        Self { database, registry }
    }

    // === Structures ===

    /// Stores a copy of `structure` under a fresh id and returns it.
    pub fn create_structure(&self, structure: &Structure) -> Result<Structure, ServiceError> {
        let created = structure.with_id(StructureId::new());
        debug!(id = %created.id, elements = created.elements.node_count(), "create structure");
        self.put_structure(&created)?;
        Ok(created)
    }

    pub fn get_structure(&self, id: &StructureId) -> Result<Option<Structure>, ServiceError> {
        debug!(%id, "get structure");
        self.database
            .gateway()
            .get(STRUCTURES, id.as_str())?
            .map(|document| self.registry.structure.decode_document(&document, self.registry))
            .transpose()
            .map_err(ServiceError::from)
    }

    /// Stores `structure` under its own id, inserting it when the id is new.
    pub fn update_structure(&self, structure: &Structure) -> Result<Structure, ServiceError> {
        debug!(id = %structure.id, "update structure");
        self.put_structure(structure)?;
        Ok(structure.clone())
    }

    /// Returns false when no structure had the id.
    pub fn delete_structure(&self, id: &StructureId) -> Result<bool, ServiceError> {
        debug!(%id, "delete structure");
        Ok(self.database.gateway().delete(STRUCTURES, id.as_str())?)
    }

    /// Projected structure rows keyed by public field name.
    pub fn list_structures(&self, query: &ListQuery) -> Result<Vec<Document>, ServiceError> {
        debug!(ids = ?query.ids, fields = ?query.fields, "list structures");
        self.list(STRUCTURES, STRUCTURE_FIELDS, query)
    }

    fn put_structure(&self, structure: &Structure) -> Result<(), ServiceError> {
        let document = self.registry.structure.encode_document(structure, self.registry)?;
        self.database
            .gateway()
            .put(STRUCTURES, structure.id.as_str(), document)?;
        Ok(())
    }

    // === Computations ===

    /// Stores `computation` under a fresh id as a new request.
    ///
    /// Any status or result carried by the input is discarded.
    pub fn create_computation(&self, computation: &Computation) -> Result<Computation, ServiceError> {
        let created = Computation {
            id: ComputationId::new(),
            status: Status::New,
            result: None,
            ..computation.clone()
        };
        debug!(
            id = %created.id,
            structure = %created.structure_id,
            element = %created.element_name,
            "create computation"
        );
        let document = self.registry.computation.encode_document(&created, self.registry)?;
        self.database
            .gateway()
            .put(COMPUTATIONS, created.id.as_str(), document)?;
        Ok(created)
    }

    pub fn get_computation(&self, id: &ComputationId) -> Result<Option<Computation>, ServiceError> {
        debug!(%id, "get computation");
        self.database
            .gateway()
            .get(COMPUTATIONS, id.as_str())?
            .map(|document| self.registry.computation.decode_document(&document, self.registry))
            .transpose()
            .map_err(ServiceError::from)
    }

    pub fn delete_computation(&self, id: &ComputationId) -> Result<bool, ServiceError> {
        debug!(%id, "delete computation");
        Ok(self.database.gateway().delete(COMPUTATIONS, id.as_str())?)
    }

    pub fn list_computations(&self, query: &ListQuery) -> Result<Vec<Document>, ServiceError> {
        debug!(ids = ?query.ids, fields = ?query.fields, "list computations");
        self.list(COMPUTATIONS, COMPUTATION_FIELDS, query)
    }

    fn list(
        &self,
        collection: &str,
        table: FieldTable,
        query: &ListQuery,
    ) -> Result<Vec<Document>, ServiceError> {
        let selected = query::select(table, &query.fields);
        let storage_fields: Vec<&str> = selected.iter().map(|(_, storage)| *storage).collect();
        let documents = self
            .database
            .gateway()
            .find(collection, &query.ids, Some(&storage_fields))?;
        Ok(documents
            .iter()
            .map(|document| query::to_row(document, &selected))
            .collect())
    }
}

impl fmt::Debug for Catalog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("database", self.database)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::error::{EncodeError, StorageError};
    use crate::model::{leaf, node, Bson, Decimal, Definition, Element, GraphBuilder};

    fn database() -> Database {
        Database::in_memory(StoreConfig::default())
    }

    fn sample_structure() -> Structure {
        let value: Decimal = "2.5".parse().unwrap();
        let root = Element::new("root", [Definition::new("var1", value)]);
        let elements = GraphBuilder::new()
            .tree(node(root, vec![leaf(Element::named("a")), leaf(Element::named("b"))]))
            .build();
        Structure::new(StructureId::from("draft"), elements)
    }

    #[test]
    fn test_structure_lifecycle() {
        let db = database();
        let catalog = Catalog::new(&db);

        let created = catalog.create_structure(&sample_structure()).unwrap();
        assert_ne!(created.id.as_str(), "draft");
        assert_eq!(catalog.get_structure(&created.id).unwrap(), Some(created.clone()));

        let mut changed = created.clone();
        changed.elements.add_node(Element::named("c"));
        catalog.update_structure(&changed).unwrap();
        let stored = catalog.get_structure(&created.id).unwrap().unwrap();
        assert_eq!(stored.elements.node_count(), 4);

        assert!(catalog.delete_structure(&created.id).unwrap());
        assert_eq!(catalog.get_structure(&created.id).unwrap(), None);
        assert!(!catalog.delete_structure(&created.id).unwrap());
    }

    #[test]
    fn test_large_exponent_definitions_are_stored() {
        let db = database();
        let catalog = Catalog::new(&db);
        let huge: Decimal = "1e2000000".parse().unwrap();
        let tiny: Decimal = "-3e-2000000".parse().unwrap();
        let element = Element::new("x", [Definition::new("big", huge), Definition::new("small", tiny)]);
        let structure = Structure::new(StructureId::new(), GraphBuilder::new().node(element).build());

        let created = catalog.create_structure(&structure).unwrap();
        let stored = catalog.get_structure(&created.id).unwrap().unwrap();
        assert_eq!(stored, created);
        let values: Vec<Decimal> = stored.element("x").unwrap().values_of("big").collect();
        assert_eq!(values, vec![huge]);
    }

    #[test]
    fn test_strict_limits_reject_create() {
        let mut config = StoreConfig::default();
        config.limits.max_string_len = 8;
        let db = Database::in_memory(config);
        let catalog = Catalog::new(&db);

        let result = catalog.create_structure(&sample_structure());
        assert!(matches!(
            result,
            Err(ServiceError::Storage(StorageError::Encode(EncodeError::LengthExceedsLimit {
                max: 8,
                ..
            })))
        ));
        assert!(catalog.list_structures(&ListQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_update_unknown_id_inserts() {
        let db = database();
        let catalog = Catalog::new(&db);
        let structure = sample_structure().with_id(StructureId::from("fixed"));
        catalog.update_structure(&structure).unwrap();
        assert_eq!(catalog.get_structure(&structure.id).unwrap(), Some(structure));
    }

    #[test]
    fn test_get_missing() {
        let db = database();
        let catalog = Catalog::new(&db);
        assert_eq!(catalog.get_structure(&StructureId::from("nope")).unwrap(), None);
        assert_eq!(catalog.get_computation(&ComputationId::from("nope")).unwrap(), None);
    }

    #[test]
    fn test_create_computation_resets_state() {
        let db = database();
        let catalog = Catalog::new(&db);
        let mut request = Computation::new(
            ComputationId::from("draft"),
            StructureId::from("s-1"),
            "root",
            "var1 + 2",
        );
        request.status = Status::Done;
        request.result = Some(Decimal::ZERO);

        let created = catalog.create_computation(&request).unwrap();
        assert_ne!(created.id.as_str(), "draft");
        assert_eq!(created.status, Status::New);
        assert_eq!(created.result, None);
        assert_eq!(catalog.get_computation(&created.id).unwrap(), Some(created.clone()));

        assert!(catalog.delete_computation(&created.id).unwrap());
        assert!(!catalog.delete_computation(&created.id).unwrap());
    }

    #[test]
    fn test_list_filters_and_projects() {
        let db = database();
        let catalog = Catalog::new(&db);
        let first = catalog
            .create_computation(&Computation::new(ComputationId::new(), StructureId::from("s-1"), "a", "1"))
            .unwrap();
        let second = catalog
            .create_computation(&Computation::new(ComputationId::new(), StructureId::from("s-2"), "b", "2"))
            .unwrap();

        assert_eq!(catalog.list_computations(&ListQuery::default()).unwrap().len(), 2);

        let query = ListQuery::parse(Some(second.id.as_str()), Some("status,elementName"));
        let rows = catalog.list_computations(&query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["id", "elementName", "status"]);
        assert_eq!(rows[0].get("id"), Some(&Bson::from(second.id.as_str())));
        assert_eq!(rows[0].get("status"), Some(&Bson::from("NEW")));

        let query = ListQuery::parse(Some(first.id.as_str()), None);
        let rows = catalog.list_computations(&query).unwrap();
        assert_eq!(rows[0].get("structureId"), Some(&Bson::from("s-1")));
        assert!(!rows[0].contains_key("_version"));
    }

    #[test]
    fn test_list_structures_projection() {
        let db = database();
        let catalog = Catalog::new(&db);
        let created = catalog.create_structure(&sample_structure()).unwrap();

        let rows = catalog.list_structures(&ListQuery::parse(None, Some("id"))).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(rows[0].get_str("id"), Ok(created.id.as_str()));

        let rows = catalog.list_structures(&ListQuery::default()).unwrap();
        assert!(rows[0].get_document("elements").is_ok());
    }
}
