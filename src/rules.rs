//! Domain model for validated action rules

/// A single configured action: a command template plus an optional input
/// extension filter and an optional output extension annotation.
///
/// `output_extension` is carried through from the config but not acted upon;
/// it documents the expected output of the command for the reader of the
/// config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub command: String,
    pub input_extension: Option<String>,
    pub output_extension: Option<String>,
}

impl Rule {
    /// Split the command template into whitespace-delimited tokens. The
    /// first token is the executable name, the rest are initial arguments.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        self.command.split_whitespace().map(String::from).collect()
    }
}

/// An ordered list of rules, loaded once per run and immutable afterwards.
/// A rule's identity is its index; rules execute in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
