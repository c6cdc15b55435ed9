//! Minimal mmCIF reader for the `_atom_site` loop.
//!
//! Only the columns needed to build an [`AtomicHierarchy`] are read; all
//! other categories are skipped. The first model in the file is kept.

use std::io::BufRead;

use super::{AtomicHierarchy, HierarchyBuilder, ResidueSite};
use crate::error::ResqualError;

const ATOM_SITE: &str = "_atom_site.";

/// Column positions within the `_atom_site` loop.
#[derive(Debug, Default)]
struct Columns {
    count: usize,
    entity_id: Option<usize>,
    label_asym_id: Option<usize>,
    auth_asym_id: Option<usize>,
    auth_seq_id: Option<usize>,
    ins_code: Option<usize>,
    comp_id: Option<usize>,
    model_num: Option<usize>,
}

impl Columns {
    fn register(&mut self, name: &str) {
        let slot = match name {
            "label_entity_id" => &mut self.entity_id,
            "label_asym_id" => &mut self.label_asym_id,
            "auth_asym_id" => &mut self.auth_asym_id,
            "auth_seq_id" => &mut self.auth_seq_id,
            "pdbx_PDB_ins_code" => &mut self.ins_code,
            "label_comp_id" => &mut self.comp_id,
            "pdbx_PDB_model_num" => &mut self.model_num,
            _ => {
                self.count += 1;
                return;
            }
        };
        *slot = Some(self.count);
        self.count += 1;
    }
}

#[derive(Debug, PartialEq, Eq)]
enum State {
    Scanning,
    LoopHeader,
    AtomSiteHeader,
    AtomSiteRows,
    OtherLoop,
}

/// Read an [`AtomicHierarchy`] from mmCIF text.
///
/// `entry_id` overrides the `_entry.id` value of the file; one of the two
/// must be present.
///
/// # Errors
///
/// Returns [`ResqualError::Io`] on read failure and
/// [`ResqualError::StructureLoad`] when the `_atom_site` loop is missing,
/// lacks a required column, or holds a malformed sequence number.
pub fn read_hierarchy<R: BufRead>(
    reader: R,
    entry_id: Option<&str>,
) -> Result<AtomicHierarchy, ResqualError> {
    let mut columns = Columns::default();
    let mut state = State::Scanning;
    let mut file_entry_id: Option<String> = None;
    let mut pending: Vec<String> = Vec::new();
    let mut first_model: Option<String> = None;
    let mut builder = HierarchyBuilder::new(entry_id.unwrap_or_default(), 1);
    let mut saw_atom_site = false;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if state == State::AtomSiteRows {
                state = State::Scanning;
            }
            continue;
        }

        if trimmed == "loop_" {
            state = State::LoopHeader;
            continue;
        }

        if let Some(name) = trimmed.strip_prefix(ATOM_SITE) {
            if matches!(state, State::LoopHeader | State::AtomSiteHeader) {
                state = State::AtomSiteHeader;
                saw_atom_site = true;
                columns.register(name.split_whitespace().next().unwrap_or(""));
                continue;
            }
        }

        if trimmed.starts_with('_') || trimmed.starts_with("data_") {
            if state == State::AtomSiteRows || state == State::AtomSiteHeader {
                state = State::Scanning;
            }
            if state == State::LoopHeader {
                state = State::OtherLoop;
            }
            if let Some(rest) = trimmed.strip_prefix("_entry.id") {
                file_entry_id = tokenize(rest).into_iter().next();
            }
            continue;
        }

        match state {
            State::AtomSiteHeader | State::AtomSiteRows => {
                state = State::AtomSiteRows;
                pending.extend(tokenize(trimmed));
                while pending.len() >= columns.count && columns.count > 0 {
                    let row: Vec<String> =
                        pending.drain(..columns.count).collect();
                    push_row(&row, &columns, &mut first_model, &mut builder)?;
                }
            }
            State::LoopHeader => state = State::OtherLoop,
            State::Scanning | State::OtherLoop => {}
        }
    }

    if !saw_atom_site {
        return Err(ResqualError::StructureLoad(
            "no _atom_site loop found".into(),
        ));
    }

    if entry_id.is_none() {
        match file_entry_id {
            Some(id) => builder.set_entry_id(id),
            None => {
                return Err(ResqualError::StructureLoad(
                    "no _entry.id and no entry id given".into(),
                ))
            }
        }
    }

    log::debug!(
        "read {} residues for entry {}",
        builder.residue_count(),
        builder.entry_id()
    );
    Ok(builder.build())
}

fn push_row(
    row: &[String],
    columns: &Columns,
    first_model: &mut Option<String>,
    builder: &mut HierarchyBuilder,
) -> Result<(), ResqualError> {
    let field = |col: Option<usize>| -> Option<&str> {
        col.and_then(|c| row.get(c))
            .map(String::as_str)
            .filter(|v| !is_null(v))
    };
    let missing =
        |name: &str| ResqualError::StructureLoad(format!("missing {name}"));

    if let Some(model) = field(columns.model_num) {
        match first_model {
            Some(first) if first != model => return Ok(()),
            Some(_) => {}
            None => *first_model = Some(model.to_owned()),
        }
    }

    let Some(seq) = field(columns.auth_seq_id) else {
        return Ok(());
    };
    let auth_seq_id: i32 = seq.parse().map_err(|_| {
        ResqualError::StructureLoad(format!("bad auth_seq_id {seq:?}"))
    })?;
    let label_asym_id = field(columns.label_asym_id)
        .ok_or_else(|| missing("_atom_site.label_asym_id"))?;
    let entity_id = field(columns.entity_id)
        .ok_or_else(|| missing("_atom_site.label_entity_id"))?;

    let _ = builder.push(&ResidueSite {
        entity_id,
        label_asym_id,
        auth_asym_id: field(columns.auth_asym_id).unwrap_or(label_asym_id),
        auth_seq_id,
        ins_code: field(columns.ins_code).unwrap_or(""),
        comp_id: field(columns.comp_id).unwrap_or(""),
    });
    Ok(())
}

fn is_null(value: &str) -> bool {
    value == "?" || value == "."
}

/// Split a CIF data line into tokens, honouring single and double quotes.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            let _ = chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '\'' || c == '"' {
            let quote = c;
            let _ = chars.next();
            while let Some(ch) = chars.next() {
                // A quote only closes the token when followed by whitespace.
                if ch == quote
                    && chars.peek().is_none_or(|next| next.is_whitespace())
                {
                    break;
                }
                token.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                let _ = chars.next();
            }
        }
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::model::{ResidueIndex, StructureModel};

    const CIF: &str = "\
data_1ABC
#
_entry.id   1ABC
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_entity_id
_atom_site.auth_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.auth_asym_id
_atom_site.pdbx_PDB_model_num
ATOM 1 N   MET A 1 1  ? X 1
ATOM 2 CA  MET A 1 1  ? X 1
ATOM 3 N   GLY A 1 2  ? X 1
ATOM 4 N   GLY A 1 2  B X 1
ATOM 5 \"O5'\" DA  B 2 10 ? Y 1
ATOM 6 N   MET A 1 1  ? X 2
#
";

    #[test]
    fn reads_first_model_residues() {
        let model = read_hierarchy(Cursor::new(CIF), None).unwrap();
        assert_eq!(model.entry_id(), "1ABC");
        assert_eq!(model.residue_count(), 4);
        assert_eq!(model.chain_count(), 2);
        assert_eq!(model.auth_asym_id(0), "X");
        assert_eq!(model.label_asym_id(1), "B");
        assert_eq!(model.find_entity("B"), Some(1));
        assert_eq!(model.find_residue("1", "A", 2, "B"), Some(ResidueIndex(2)));
        assert_eq!(model.find_residue("2", "B", 10, ""), Some(ResidueIndex(3)));
        assert_eq!(model.residue(ResidueIndex(3)).unwrap().comp_id, "DA");
    }

    #[test]
    fn explicit_entry_id_wins() {
        let model = read_hierarchy(Cursor::new(CIF), Some("9xyz")).unwrap();
        assert_eq!(model.entry_id(), "9xyz");
    }

    #[test]
    fn missing_atom_site_is_an_error() {
        let err = read_hierarchy(Cursor::new("data_x\n_entry.id x\n"), None)
            .unwrap_err();
        assert!(matches!(err, ResqualError::StructureLoad(_)));
    }

    #[test]
    fn tokenizer_handles_quotes() {
        assert_eq!(
            tokenize("ATOM 'C1' \"O5'\" it's"),
            vec!["ATOM", "C1", "O5'", "it's"]
        );
    }
}
