//! Import driver: classifies each block start and hands the stream to the
//! matching importer.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use cdb_inp::{BlockKind, LineCursor, classify_next};
use cdb_model::{Mesh, MeshSink};
use log::{debug, info};

use crate::element_table::ElementTypeTable;
use crate::elements::{declare_element_type, import_elements};
use crate::error::{ImportError, Result};
use crate::groups::import_component;
use crate::nodes::import_nodes;
use crate::options::ImportOptions;
use crate::session::{ImportReport, ImportSession};

/// Reads CDB streams into a [`MeshSink`].
///
/// Every read clears the sink first; nothing carries over between reads.
/// The sink is marked complete only when a read succeeds, so a failed read
/// leaves it flagged as partial.
pub struct CdbReader<'m, S: MeshSink + ?Sized> {
    sink: &'m mut S,
    table: &'m ElementTypeTable,
    options: ImportOptions,
}

impl<'m, S: MeshSink + ?Sized> CdbReader<'m, S> {
    /// Reader with the built-in ANSYS element table and default options.
    pub fn new(sink: &'m mut S) -> Self {
        Self {
            sink,
            table: ElementTypeTable::ansys(),
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the element table, e.g. to add families the built-in table
    /// lacks.
    pub fn with_table(mut self, table: &'m ElementTypeTable) -> Self {
        self.table = table;
        self
    }

    /// Import the file at `path`.
    pub fn read(&mut self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ImportError::StreamUnreadable {
            path: path.display().to_string(),
            source,
        })?;
        debug!("reading {}", path.display());

        self.read_from(BufReader::new(file))
            .map_err(|err| match err {
                ImportError::StreamUnreadable { source, .. } => ImportError::StreamUnreadable {
                    path: path.display().to_string(),
                    source,
                },
                other => other,
            })
    }

    /// Import from any buffered stream.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> Result<ImportReport> {
        self.sink.clear();
        self.sink.set_complete(false);

        let mut cursor = LineCursor::new(reader);
        let mut session = ImportSession::new(self.table, self.options.clone());

        loop {
            match classify_next(&mut cursor)? {
                BlockKind::EndOfStream => break,
                BlockKind::CoordinateBlockStart => {
                    import_nodes(&mut cursor, &mut session, &mut *self.sink)?;
                }
                BlockKind::ElementTypeDecl => {
                    declare_element_type(&mut cursor, &mut session)?;
                }
                BlockKind::ElementBlockStart => {
                    import_elements(&mut cursor, &mut session, &mut *self.sink)?;
                }
                BlockKind::NodeGroupBlockStart => {
                    import_component(&mut cursor, &mut session, &mut *self.sink)?;
                }
                BlockKind::Unrecognized => {
                    cursor.next_line()?;
                    session.skipped_lines += 1;
                }
            }
        }

        if self.options.validate {
            self.sink.validate()?;
        }
        self.sink.set_complete(true);

        let report = session.report();
        info!(
            "imported {} points, {} elements in {} partitions, {} node groups, {} element groups",
            report.points,
            report.elements,
            report.partitions,
            report.node_groups,
            report.element_groups
        );
        debug!("skipped {} lines", report.skipped_lines);
        Ok(report)
    }
}

/// Clear `mesh` and fill it from the CDB file at `path` with default options.
pub fn import(path: impl AsRef<Path>, mesh: &mut Mesh) -> Result<()> {
    CdbReader::new(mesh).read(path).map(|_| ())
}
