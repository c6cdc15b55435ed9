use rustc_hash::FxHashMap;

use super::{ModelId, ResidueIndex, StructureModel};

/// Display information for one residue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueInfo {
    /// Internal chain label.
    pub label_asym_id: String,
    /// Author chain label.
    pub auth_asym_id: String,
    /// Author sequence number.
    pub auth_seq_id: i32,
    /// Insertion code (`""` for none).
    pub ins_code: String,
    /// Three-letter residue name.
    pub comp_id: String,
}

/// One residue as it appears in an atom-site listing.
#[derive(Debug, Clone, Copy)]
pub struct ResidueSite<'a> {
    /// Entity id as deposited (`"1"`, `"2"`, ...).
    pub entity_id: &'a str,
    /// Internal chain label.
    pub label_asym_id: &'a str,
    /// Author chain label.
    pub auth_asym_id: &'a str,
    /// Author sequence number.
    pub auth_seq_id: i32,
    /// Insertion code (`""` for none).
    pub ins_code: &'a str,
    /// Three-letter residue name.
    pub comp_id: &'a str,
}

#[derive(Debug, Clone)]
struct Chain {
    label_asym_id: String,
    auth_asym_id: String,
    entity: usize,
}

#[derive(Debug, Clone)]
struct Residue {
    chain: usize,
    auth_seq_id: i32,
    ins_code: String,
    comp_id: String,
}

/// `(entity id, label asym id, auth seq id, insertion code)`.
type ResidueKey = (String, String, i32, String);

/// In-memory atomic hierarchy: entities, chains and residues of one model.
#[derive(Debug, Clone)]
pub struct AtomicHierarchy {
    id: ModelId,
    entry_id: String,
    model_num: i32,
    entity_ids: Vec<String>,
    chains: Vec<Chain>,
    residues: Vec<Residue>,
    chain_by_label: FxHashMap<String, usize>,
    residue_lookup: FxHashMap<ResidueKey, ResidueIndex>,
}

impl AtomicHierarchy {
    /// Entity ids in table order.
    #[must_use]
    pub fn entity_ids(&self) -> &[String] {
        &self.entity_ids
    }

    /// Iterate over all residue ordinals with their display info.
    pub fn residues(
        &self,
    ) -> impl Iterator<Item = (ResidueIndex, ResidueInfo)> + '_ {
        (0..self.residues.len()).filter_map(|i| {
            let index = ResidueIndex(i as u32);
            self.residue(index).map(|info| (index, info))
        })
    }
}

impl StructureModel for AtomicHierarchy {
    fn id(&self) -> ModelId {
        self.id
    }

    fn entry_id(&self) -> &str {
        &self.entry_id
    }

    fn model_num(&self) -> i32 {
        self.model_num
    }

    fn residue_count(&self) -> usize {
        self.residues.len()
    }

    fn chain_count(&self) -> usize {
        self.chains.len()
    }

    fn auth_asym_id(&self, chain: usize) -> &str {
        self.chains.get(chain).map_or("", |c| c.auth_asym_id.as_str())
    }

    fn label_asym_id(&self, chain: usize) -> &str {
        self.chains.get(chain).map_or("", |c| c.label_asym_id.as_str())
    }

    fn find_entity(&self, label_asym_id: &str) -> Option<usize> {
        self.chain_by_label
            .get(label_asym_id)
            .and_then(|&c| self.chains.get(c))
            .map(|c| c.entity)
    }

    fn find_residue(
        &self,
        entity_id: &str,
        label_asym_id: &str,
        auth_seq_id: i32,
        ins_code: &str,
    ) -> Option<ResidueIndex> {
        let key = (
            entity_id.to_owned(),
            label_asym_id.to_owned(),
            auth_seq_id,
            ins_code.to_owned(),
        );
        self.residue_lookup.get(&key).copied()
    }

    fn residue(&self, index: ResidueIndex) -> Option<ResidueInfo> {
        let residue = self.residues.get(index.as_usize())?;
        let chain = self.chains.get(residue.chain)?;
        Some(ResidueInfo {
            label_asym_id: chain.label_asym_id.clone(),
            auth_asym_id: chain.auth_asym_id.clone(),
            auth_seq_id: residue.auth_seq_id,
            ins_code: residue.ins_code.clone(),
            comp_id: residue.comp_id.clone(),
        })
    }
}

/// Incremental builder for [`AtomicHierarchy`].
///
/// Sites are pushed in file order. Consecutive sites naming the same
/// residue collapse into one; chains and entities are registered in
/// first-seen order.
pub struct HierarchyBuilder {
    entry_id: String,
    model_num: i32,
    entity_ids: Vec<String>,
    entity_by_id: FxHashMap<String, usize>,
    chains: Vec<Chain>,
    chain_by_label: FxHashMap<String, usize>,
    residues: Vec<Residue>,
    residue_lookup: FxHashMap<ResidueKey, ResidueIndex>,
}

impl HierarchyBuilder {
    /// Start an empty hierarchy for `entry_id`, model `model_num`.
    pub fn new(entry_id: impl Into<String>, model_num: i32) -> Self {
        Self {
            entry_id: entry_id.into(),
            model_num,
            entity_ids: Vec::new(),
            entity_by_id: FxHashMap::default(),
            chains: Vec::new(),
            chain_by_label: FxHashMap::default(),
            residues: Vec::new(),
            residue_lookup: FxHashMap::default(),
        }
    }

    /// Entry identifier this builder was created with.
    #[must_use]
    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    /// Replace the entry identifier (e.g. once `_entry.id` is read).
    pub fn set_entry_id(&mut self, entry_id: impl Into<String>) {
        self.entry_id = entry_id.into();
    }

    /// Register a residue site and return its ordinal.
    pub fn push(&mut self, site: &ResidueSite<'_>) -> ResidueIndex {
        let entity = self.entity_index(site.entity_id);
        let chain = self.chain_index(site, entity);

        if let Some(last) = self.residues.last() {
            if last.chain == chain
                && last.auth_seq_id == site.auth_seq_id
                && last.ins_code == site.ins_code
            {
                return ResidueIndex(self.residues.len() as u32 - 1);
            }
        }

        let index = ResidueIndex(self.residues.len() as u32);
        self.residues.push(Residue {
            chain,
            auth_seq_id: site.auth_seq_id,
            ins_code: site.ins_code.to_owned(),
            comp_id: site.comp_id.to_owned(),
        });
        let _ = self
            .residue_lookup
            .entry((
                self.entity_ids[entity].clone(),
                site.label_asym_id.to_owned(),
                site.auth_seq_id,
                site.ins_code.to_owned(),
            ))
            .or_insert(index);
        index
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, site: &ResidueSite<'_>) -> Self {
        let _ = self.push(site);
        self
    }

    /// Number of residues registered so far.
    #[must_use]
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// Finish building with a fresh [`ModelId`].
    #[must_use]
    pub fn build(self) -> AtomicHierarchy {
        AtomicHierarchy {
            id: ModelId::next(),
            entry_id: self.entry_id,
            model_num: self.model_num,
            entity_ids: self.entity_ids,
            chains: self.chains,
            residues: self.residues,
            chain_by_label: self.chain_by_label,
            residue_lookup: self.residue_lookup,
        }
    }

    fn entity_index(&mut self, entity_id: &str) -> usize {
        if let Some(&idx) = self.entity_by_id.get(entity_id) {
            return idx;
        }
        let idx = self.entity_ids.len();
        self.entity_ids.push(entity_id.to_owned());
        let _ = self.entity_by_id.insert(entity_id.to_owned(), idx);
        idx
    }

    fn chain_index(&mut self, site: &ResidueSite<'_>, entity: usize) -> usize {
        if let Some(&idx) = self.chain_by_label.get(site.label_asym_id) {
            return idx;
        }
        let idx = self.chains.len();
        self.chains.push(Chain {
            label_asym_id: site.label_asym_id.to_owned(),
            auth_asym_id: site.auth_asym_id.to_owned(),
            entity,
        });
        let _ = self
            .chain_by_label
            .insert(site.label_asym_id.to_owned(), idx);
        idx
    }
}
