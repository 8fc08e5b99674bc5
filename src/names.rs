use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const ADJECTIVES: &[&str] = &[
    "amber", "bold", "calm", "dark", "eager", "fair", "glad", "hazy", "icy", "jade",
    "keen", "lush", "mild", "neat", "opal", "pale", "quick", "rosy", "soft", "tidy",
    "vast", "warm", "zany", "aqua", "blue", "crisp", "dusty", "ember", "fresh", "gold",
    "happy", "ivory", "jolly", "kind", "lazy", "merry", "noble", "olive", "plum", "quiet",
    "rapid", "sage", "tall", "ultra", "vivid", "wise", "young", "zen", "agile", "brave",
    "brisk", "cosmic", "daring", "fuzzy", "gentle", "humble", "lucky", "misty", "nimble", "sunny",
];

pub const ANIMALS: &[&str] = &[
    "ant", "bat", "cat", "dog", "elk", "fox", "gnu", "hawk", "ibis", "jay",
    "koi", "lynx", "mole", "newt", "owl", "puma", "quail", "ram", "seal", "toad",
    "vole", "wolf", "yak", "crab", "eel", "frog", "goat", "hare", "koala", "lamb",
    "mink", "narwhal", "orca", "panda", "raven", "swan", "tiger", "urchin", "viper", "wren",
    "zebra", "bear", "crow", "dove", "egret", "finch", "gull", "heron", "otter", "badger",
    "bison", "camel", "dingo", "gecko", "iguana", "jackal", "lemur", "moose", "okapi", "walrus",
];

/// Source of uniformly distributed floats in `[0, 1)`.
///
/// Each call advances the stream; values are never replayed.
pub trait RandomStream {
    fn next_f64(&mut self) -> f64;
}

/// The default stream. ChaCha8 output is fully specified, so a given seed
/// yields the same names on every platform.
#[derive(Debug, Clone)]
pub struct ChaChaStream(ChaCha8Rng);

impl ChaChaStream {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomStream for ChaChaStream {
    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Supplies a seed when the caller did not pick one.
pub trait SeedProvider {
    fn seed(&mut self) -> u64;
}

/// Seeds from the thread-local entropy source.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropySeed;

impl SeedProvider for EntropySeed {
    fn seed(&mut self) -> u64 {
        rand::random::<u64>()
    }
}

impl<F: FnMut() -> u64> SeedProvider for F {
    fn seed(&mut self) -> u64 {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameGeneratorConfig {
    pub seed: Option<u64>,
    pub separator: String,
    pub capitalize: bool,
    pub add_numbers: bool,
}

impl Default for NameGeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            separator: " ".to_string(),
            capitalize: false,
            add_numbers: false,
        }
    }
}

/// Draws `adjective{sep}animal[{sep}NN]` names from a seeded stream.
#[derive(Debug)]
pub struct NameGenerator<S = ChaChaStream> {
    config: NameGeneratorConfig,
    stream: S,
}

impl NameGenerator<ChaChaStream> {
    pub fn new(config: NameGeneratorConfig) -> Self {
        Self::with_seed_provider(config, EntropySeed)
    }

    /// Like [`NameGenerator::new`], but asks `provider` for a seed when the
    /// config has none. The provider is not consulted otherwise.
    pub fn with_seed_provider(config: NameGeneratorConfig, mut provider: impl SeedProvider) -> Self {
        let seed = config.seed.unwrap_or_else(|| provider.seed());
        Self::with_stream(config, ChaChaStream::from_seed(seed))
    }
}

impl<S: RandomStream> NameGenerator<S> {
    /// Builds a generator over an arbitrary stream. `config.seed` is ignored.
    pub fn with_stream(config: NameGeneratorConfig, stream: S) -> Self {
        Self { config, stream }
    }

    /// Draw the next name. Each call advances the stream by two draws, or
    /// three when numbers are on.
    pub fn next_name(&mut self) -> String {
        let adjective = self.pick(ADJECTIVES);
        let animal = self.pick(ANIMALS);

        let sep = &self.config.separator;
        let mut name = if self.config.capitalize {
            format!("{}{sep}{}", capitalize(adjective), capitalize(animal))
        } else {
            format!("{adjective}{sep}{animal}")
        };

        if self.config.add_numbers {
            let number = scale(self.stream.next_f64(), 100);
            name.push_str(sep);
            name.push_str(&number.to_string());
        }
        name
    }

    fn pick(&mut self, words: &'static [&'static str]) -> &'static str {
        words[scale(self.stream.next_f64(), words.len())]
    }
}

impl<S: RandomStream> Iterator for NameGenerator<S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_name())
    }
}

/// `floor(value * len)`, clamped into `0..len` in case a stream hands back
/// something at or past 1.0. Float-to-int `as` saturates negatives to zero.
fn scale(value: f64, len: usize) -> usize {
    ((value * len as f64) as usize).min(len - 1)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
