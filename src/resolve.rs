use anyhow::{Result, bail};
use std::path::Path;

use crate::names::{NameGenerator, NameGeneratorConfig, RandomStream};

/// How the caller wants the sandbox name chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRequest {
    /// Use this name as-is. Collisions surface later when the directory is created.
    Explicit(String),
    /// Derive `{base}-copy`, `{base}-copy-1`, ... from an existing sandbox name.
    CopyOf(String),
    /// Generate `adjective-animal-NN` names until one is free.
    Fresh { seed: Option<u64> },
}

/// Picks names that don't collide with entries under `root`.
///
/// `exists` is asked about `root/<candidate>`; in production it is
/// [`Path::exists`], tests pass an in-memory set.
pub struct Resolver<'a, F> {
    root: &'a Path,
    exists: F,
    max_attempts: Option<u64>,
}

impl<'a, F: Fn(&Path) -> bool> Resolver<'a, F> {
    pub fn new(root: &'a Path, exists: F) -> Self {
        Self {
            root,
            exists,
            max_attempts: None,
        }
    }

    /// Caps fresh-name probing. `None` probes forever.
    pub fn max_attempts(mut self, limit: Option<u64>) -> Self {
        self.max_attempts = limit;
        self
    }

    pub fn resolve(&self, request: NameRequest) -> Result<String> {
        match request {
            NameRequest::Explicit(name) => Ok(name),
            NameRequest::CopyOf(base) => Ok(self.copy_name(&base)),
            NameRequest::Fresh { seed } => {
                let mut generator = NameGenerator::new(fresh_config(seed));
                self.fresh_name(&mut generator)
            }
        }
    }

    /// Draws from `generator` until a name is free under the root.
    ///
    /// Without a cap this never returns if every name is taken; the space is
    /// adjectives x animals x 100, so that doesn't happen in practice.
    pub fn fresh_name<S: RandomStream>(&self, generator: &mut NameGenerator<S>) -> Result<String> {
        let mut attempts: u64 = 0;
        loop {
            if let Some(limit) = self.max_attempts
                && attempts >= limit
            {
                bail!(
                    "no free name found under {} after {} attempts",
                    self.root.display(),
                    attempts
                );
            }
            let name = generator.next_name();
            attempts += 1;
            if !self.taken(&name) {
                return Ok(name);
            }
        }
    }

    pub fn copy_name(&self, base: &str) -> String {
        let first = format!("{base}-copy");
        if !self.taken(&first) {
            return first;
        }
        let mut counter: u64 = 1;
        loop {
            let candidate = format!("{base}-copy-{counter}");
            if !self.taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn taken(&self, name: &str) -> bool {
        (self.exists)(&self.root.join(name))
    }
}

/// Generator settings for fresh sandbox names: `calm-otter-42`.
pub fn fresh_config(seed: Option<u64>) -> NameGeneratorConfig {
    NameGeneratorConfig {
        seed,
        separator: "-".to_string(),
        capitalize: false,
        add_numbers: true,
    }
}
