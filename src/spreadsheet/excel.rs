//! Office Open XML package helpers
use crate::error::CombineSheetsError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use zip::ZipArchive;

/// Package archive read straight from the local file
pub(crate) type Archive = ZipArchive<BufReader<File>>;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Leading bytes of a compound file binary container.
/// Encrypted (password protected) xlsx files are wrapped in one.
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Opens an Excel package and loads its workbook-level metadata
///
/// # Arguments
/// * `path` - Path to the Excel file
/// * `load_workbook` - Function to load workbook metadata and sheets
/// * `load_number_formats` - Function to load number formatting information
///
/// # Returns
/// Tuple containing:
/// - Zip archive handle
/// - Number format mappings
/// - Declared sheets, as described by `load_workbook`
pub(super) fn open<S, W, F>(path: &Path, load_workbook: W, load_number_formats: F) -> Result<(
    Archive,
    Vec<CellType>,
    Vec<S>
), CombineSheetsError>
where
    W: Fn(&mut Archive) -> Result<(Vec<S>, bool), CombineSheetsError>,
    F: Fn(&mut Archive, bool) -> Result<Vec<CellType>, CombineSheetsError>,
{
    let file_name = path.display().to_string();
    let mut file = File::open(path)?;

    if is_compound_document(&mut file)? {
        Err(SpreadsheetError::CompoundDocumentError(file_name.to_owned()))?;
    }

    let mut zip = ZipArchive::new(BufReader::new(file))
        .map_err(|error| SpreadsheetError::FormatError(file_name.to_owned(), error.to_string()))?;
    let (sheets, is_1904) = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
    }

    let number_formats = load_number_formats(&mut zip, is_1904).with_prefix("xl/styles.xml")?;
    Ok((zip, number_formats, sheets))
}

/// A package relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Relationship {
    /// Last segment of the relationship type, such as `worksheet` or `chartsheet`
    pub(crate) kind: Option<String>,
    /// Target part inside the package
    pub(crate) target: String,
}

impl Relationship {
    /// True for worksheet relationships; a relationship without a type counts as one.
    pub(crate) fn is_worksheet(&self) -> bool {
        self.kind.as_deref().map(|kind| kind == "worksheet").unwrap_or(true)
    }
}

/// Loads the relationships of a package part
///
/// # Returns
/// Mapping of relationship IDs to their kind and target path
pub(super) fn load_relationships(zip: &mut Archive, path: &str) -> Result<HashMap<String, Relationship>, CombineSheetsError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, Relationship> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?
                .map(|kind| kind.rsplit('/').next().unwrap_or_default().to_owned());
            let target = event.get_attribute_value("Target")?;
            if let Some((id, target)) = id.zip(target) {
                relationships.insert(id.to_string(), Relationship {
                    kind,
                    target: to_zip_path(target),
                });
            }
        }
    });
    Ok(relationships)
}

/// Maps format indexes to cell types using custom and built-in formats
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target to a path inside the package
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if path.starts_with("/xl/") {
        path[1..].to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Sniffs the compound file signature and rewinds the file.
fn is_compound_document(file: &mut File) -> Result<bool, CombineSheetsError> {
    let mut signature = [0u8; 8];
    let matched = match file.read_exact(&mut signature) {
        Ok(()) => signature == CFB_SIGNATURE,
        Err(error) if error.kind() == ErrorKind::UnexpectedEof => false,
        Err(error) => Err(error)?,
    };
    file.seek(SeekFrom::Start(0))?;
    Ok(matched)
}
