//! Graph assembly over reconstructed justifications.
//!
//! The store loads three row sets for one read (the page, the justifications
//! its targets lead to, and the counters of the page) and merges them into a
//! [`JustificationIndex`]. The index reports which secondary entities to load
//! in batches, and [`JustificationIndex::assemble`] splices the loaded
//! entities back in. Every node referencing the same media excerpt receives a
//! clone of the same `Arc`.

use std::{
  collections::{BTreeMap, BTreeSet, HashMap, HashSet},
  sync::Arc,
};

use warrant_core::{
  entity::{
    BasisCompoundAtomEntity, EntityKind, EntityOrRef, MediaExcerpt, Proposition,
    SourceExcerpt, SourceExcerptType, Statement, UserBlurb, WritQuoteUrl,
  },
  justification::{
    BasisType, Justification, JustificationBasis, JustificationTarget, RootTarget,
    TargetType,
  },
};

use crate::{
  Error, Result,
  reconstruct::ReconstructedJustifications,
  resolve::{
    BasisLookups, TargetLookups, resolve_basis, resolve_root_target, resolve_source_excerpt,
    resolve_target,
  },
};

/// Secondary entities loaded in batches for one read.
#[derive(Debug, Default)]
pub struct GraphLookups {
  pub propositions:    HashMap<i64, Proposition>,
  pub statements:      HashMap<i64, Statement>,
  pub media_excerpts:  HashMap<i64, Arc<MediaExcerpt>>,
  pub users:           HashMap<i64, UserBlurb>,
  /// Present only when the read asked for URLs.
  pub writ_quote_urls: Option<HashMap<i64, Vec<WritQuoteUrl>>>,
  /// Chain members per media excerpt id, from
  /// [`JustificationIndex::media_excerpt_chains`].
  pub chains:          BTreeMap<i64, BTreeSet<i64>>,
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Every justification one read touches, keyed by id.
#[derive(Debug, Default)]
pub struct JustificationIndex {
  primary_ids:        Vec<i64>,
  nodes:              HashMap<i64, Justification>,
  counters_by_target: HashMap<i64, Vec<i64>>,
}

impl JustificationIndex {
  pub fn new(
    primary: ReconstructedJustifications,
    targets: ReconstructedJustifications,
    counters: ReconstructedJustifications,
  ) -> Self {
    let mut counters_by_target: HashMap<i64, Vec<i64>> = HashMap::new();
    for id in &counters.ids {
      if let Some(counter) = counters.by_id.get(id) {
        counters_by_target.entry(counter.target.target_id()).or_default().push(*id);
      }
    }

    let mut nodes = counters.by_id;
    nodes.extend(targets.by_id);
    nodes.extend(primary.by_id);

    Self { primary_ids: primary.ids, nodes, counters_by_target }
  }

  fn sorted_node_ids(&self) -> Vec<i64> {
    let mut ids: Vec<i64> = self.nodes.keys().copied().collect();
    ids.sort_unstable();
    ids
  }

  /// Walk each node's JUSTIFICATION targets until a node with a media
  /// excerpt basis. Returns the chain members that reach each excerpt. A link
  /// missing from the index abandons that walk.
  pub fn media_excerpt_chains(&self) -> BTreeMap<i64, BTreeSet<i64>> {
    let mut chains: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();

    for start in self.sorted_node_ids() {
      let mut path = Vec::new();
      let mut seen = HashSet::new();
      let mut current = start;
      loop {
        let Some(node) = self.nodes.get(&current) else {
          tracing::warn!(
            justification_id = start,
            missing = current,
            "chain link is not materialized; abandoning media excerpt walk"
          );
          break;
        };
        if !seen.insert(current) {
          tracing::warn!(justification_id = start, "justification target chain loops");
          break;
        }
        path.push(current);

        if node.basis.basis_type() == BasisType::MediaExcerpt {
          chains.entry(node.basis.basis_id()).or_default().extend(path.iter().copied());
          break;
        }
        match node.target.target_type() {
          TargetType::Justification => current = node.target.target_id(),
          TargetType::Proposition | TargetType::Statement => break,
        }
      }
    }

    chains
  }

  /// Media excerpts quoted by source excerpt paraphrases in basis compounds.
  pub fn paraphrased_media_excerpt_ids(&self) -> BTreeSet<i64> {
    let mut ids = BTreeSet::new();
    for node in self.nodes.values() {
      let JustificationBasis::JustificationBasisCompound(EntityOrRef::Entity(compound)) =
        &node.basis
      else {
        continue;
      };
      for atom in &compound.atoms {
        if let BasisCompoundAtomEntity::SourceExcerptParaphrase(EntityOrRef::Entity(sep)) =
          &atom.entity
          && let SourceExcerpt::MediaExcerpt(EntityOrRef::Ref(id)) = sep.source_excerpt
        {
          ids.insert(id);
        }
      }
    }
    ids
  }

  /// Statement ids used as a target or a root target.
  pub fn statement_ids(&self) -> Vec<i64> {
    let mut ids = BTreeSet::new();
    for node in self.nodes.values() {
      if let JustificationTarget::Statement(_) = node.target {
        ids.insert(node.target.target_id());
      }
      if let RootTarget::Statement(_) = node.root_target {
        ids.insert(node.root_target.root_target_id());
      }
    }
    ids.into_iter().collect()
  }

  pub fn creator_ids(&self) -> Vec<i64> {
    let ids: BTreeSet<i64> = self
      .nodes
      .values()
      .map(|node| match &node.creator {
        EntityOrRef::Entity(user) => user.user_id,
        EntityOrRef::Ref(id) => *id,
      })
      .collect();
    ids.into_iter().collect()
  }

  /// Writ quotes hydrated as a basis.
  pub fn writ_quote_ids(&self) -> Vec<i64> {
    let ids: BTreeSet<i64> = self
      .nodes
      .values()
      .filter_map(|node| match &node.basis {
        JustificationBasis::WritQuote(EntityOrRef::Entity(wq)) => Some(wq.writ_quote_id),
        _ => None,
      })
      .collect();
    ids.into_iter().collect()
  }

  // ── Assembly ────────────────────────────────────────────────────────────

  /// Build the page in query order. Target chains are nested as deep as the
  /// index reaches; counters are attached to page-level justifications only,
  /// with their target left as a reference.
  pub fn assemble(&self, lookups: &GraphLookups) -> Result<Vec<Justification>> {
    let chain_excerpts = lookups
      .chains
      .iter()
      .flat_map(|(&media_excerpt_id, members)| {
        members.iter().map(move |&member| (member, media_excerpt_id))
      })
      .collect();
    let assembler = Assembler { index: self, lookups, chain_excerpts };
    self
      .primary_ids
      .iter()
      .map(|&id| {
        let mut justification = assembler.node(id, &mut Vec::new())?;
        justification.counter_justifications = self
          .counters_by_target
          .get(&id)
          .into_iter()
          .flatten()
          .map(|&counter_id| assembler.counter(counter_id))
          .collect::<Result<_>>()?;
        Ok(justification)
      })
      .collect()
  }
}

struct Assembler<'a> {
  index:          &'a JustificationIndex,
  lookups:        &'a GraphLookups,
  /// Chain member id to the media excerpt its targets lead to.
  chain_excerpts: HashMap<i64, i64>,
}

fn require(hydrated: bool, kind: EntityKind, id: i64) -> Result<()> {
  if hydrated {
    Ok(())
  } else {
    Err(Error::impossible(format!("{kind} {id} is missing from its batched lookup")))
  }
}

impl Assembler<'_> {
  fn shell(&self, id: i64) -> Result<Justification> {
    self
      .index
      .nodes
      .get(&id)
      .cloned()
      .ok_or_else(|| Error::impossible(format!("justification {id} is not in the index")))
  }

  fn node(&self, id: i64, visiting: &mut Vec<i64>) -> Result<Justification> {
    if visiting.contains(&id) {
      return Err(Error::impossible(format!(
        "justification target cycle through {id}: {visiting:?}"
      )));
    }
    visiting.push(id);

    let mut justification = self.hydrate(self.shell(id)?)?;
    if let JustificationTarget::Justification(EntityOrRef::Ref(target_id)) =
      justification.target
    {
      if self.index.nodes.contains_key(&target_id) {
        let target = self.node(target_id, visiting)?;
        justification.target = JustificationTarget::Justification(EntityOrRef::Entity(
          Box::new(target),
        ));
      } else {
        tracing::warn!(
          justification_id = id,
          target_id,
          "target justification was not loaded"
        );
      }
    }

    visiting.pop();
    self.check_shared_excerpt(&justification)?;
    check_polarity(&justification);
    Ok(justification)
  }

  /// A chain member's nested targets must end at the loaded instance of its
  /// media excerpt.
  fn check_shared_excerpt(&self, justification: &Justification) -> Result<()> {
    let Some(&media_excerpt_id) = self.chain_excerpts.get(&justification.id) else {
      return Ok(());
    };
    let mut current = justification;
    let reached = loop {
      match (&current.basis, &current.target) {
        (JustificationBasis::MediaExcerpt(EntityOrRef::Entity(me)), _) => break Some(me),
        (_, JustificationTarget::Justification(EntityOrRef::Entity(target))) => {
          current = &**target;
        }
        _ => break None,
      }
    };
    match (reached, self.lookups.media_excerpts.get(&media_excerpt_id)) {
      (Some(reached), Some(shared)) if Arc::ptr_eq(reached, shared) => Ok(()),
      _ => Err(Error::impossible(format!(
        "justification {} does not reach the shared media excerpt {media_excerpt_id}",
        justification.id
      ))),
    }
  }

  fn counter(&self, id: i64) -> Result<Justification> {
    let counter = self.hydrate(self.shell(id)?)?;
    check_polarity(&counter);
    Ok(counter)
  }

  /// Hydrate everything except JUSTIFICATION targets.
  fn hydrate(&self, mut j: Justification) -> Result<Justification> {
    let target_lookups = TargetLookups {
      propositions:   Some(&self.lookups.propositions),
      statements:     Some(&self.lookups.statements),
      justifications: None,
    };

    let target_type = j.target.target_type();
    if target_type != TargetType::Justification {
      let target_id = j.target.target_id();
      j.target = resolve_target(target_type, target_id, &target_lookups);
      let (kind, hydrated) = match &j.target {
        JustificationTarget::Proposition(p) => (EntityKind::Proposition, p.is_hydrated()),
        JustificationTarget::Statement(s) => (EntityKind::Statement, s.is_hydrated()),
        JustificationTarget::Justification(_) => (EntityKind::Justification, true),
      };
      require(hydrated, kind, target_id)?;
    }

    let root_id = j.root_target.root_target_id();
    j.root_target =
      resolve_root_target(j.root_target.root_target_type(), root_id, &target_lookups);
    let (kind, hydrated) = match &j.root_target {
      RootTarget::Proposition(p) => (EntityKind::Proposition, p.is_hydrated()),
      RootTarget::Statement(s) => (EntityKind::Statement, s.is_hydrated()),
    };
    require(hydrated, kind, root_id)?;

    self.hydrate_basis(&mut j.basis)?;

    let creator_id = match &j.creator {
      EntityOrRef::Entity(user) => user.user_id,
      EntityOrRef::Ref(id) => *id,
    };
    j.creator = EntityOrRef::from_lookup(creator_id, self.lookups.users.get(&creator_id));
    require(j.creator.is_hydrated(), EntityKind::User, creator_id)?;

    Ok(j)
  }

  fn hydrate_basis(&self, basis: &mut JustificationBasis) -> Result<()> {
    match basis {
      JustificationBasis::MediaExcerpt(EntityOrRef::Ref(id)) => {
        let id = *id;
        let lookups = BasisLookups {
          media_excerpts: Some(&self.lookups.media_excerpts),
          ..BasisLookups::default()
        };
        *basis = resolve_basis(BasisType::MediaExcerpt, id, &lookups);
        let hydrated = matches!(basis, JustificationBasis::MediaExcerpt(EntityOrRef::Entity(_)));
        require(hydrated, EntityKind::MediaExcerpt, id)?;
      }
      JustificationBasis::WritQuote(EntityOrRef::Entity(wq)) => {
        if let Some(urls) = &self.lookups.writ_quote_urls {
          wq.urls = Some(urls.get(&wq.writ_quote_id).cloned().unwrap_or_default());
        }
      }
      JustificationBasis::JustificationBasisCompound(EntityOrRef::Entity(compound)) => {
        for atom in &mut compound.atoms {
          if let BasisCompoundAtomEntity::SourceExcerptParaphrase(EntityOrRef::Entity(sep)) =
            &mut atom.entity
            && let SourceExcerpt::MediaExcerpt(EntityOrRef::Ref(id)) = sep.source_excerpt
          {
            sep.source_excerpt = resolve_source_excerpt(
              SourceExcerptType::MediaExcerpt,
              id,
              None,
              Some(&self.lookups.media_excerpts),
            );
          }
        }
      }
      JustificationBasis::MediaExcerpt(EntityOrRef::Entity(_))
      | JustificationBasis::WritQuote(EntityOrRef::Ref(_))
      | JustificationBasis::PropositionCompound(_)
      | JustificationBasis::JustificationBasisCompound(EntityOrRef::Ref(_)) => {}
    }
    Ok(())
  }
}

fn check_polarity(justification: &Justification) {
  if let Some(violation) = justification.polarity_violation() {
    tracing::warn!(
      justification_id = justification.id,
      ?violation,
      "justification breaks a polarity rule"
    );
  }
}
