//! Alias tables: ordered textual substitutions applied to path patterns.
//!
//! ```json
//! "aliases": [
//!   { "name": "%res%",  "path": "%root%/res" },
//!   { "name": "%root%", "path": "app" }
//! ]
//! ```
//!
//! Table order is substitution priority: when one name is a substring of
//! another, the earlier alias wins.

use serde::Deserialize;

/// A named substitution rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Alias {
    pub name: String,
    pub path: String,
}

impl Alias {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Ordered alias table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: Vec<Alias>,
}

impl AliasTable {
    /// Wrap aliases as-is, without substituting them into each other.
    #[cfg(test)]
    pub fn new(aliases: Vec<Alias>) -> Self {
        Self { aliases }
    }

    /// Substitute aliases into each other's paths, in a single pass.
    ///
    /// For each alias in order, every *other* alias name found in its path is
    /// replaced by that alias's current path (which may already have been
    /// rewritten earlier in the pass). This is not iterated to a fixed point:
    /// forward references and cycles resolve only partially, but always the
    /// same way for the same input order.
    pub fn prepare(aliases: Vec<Alias>) -> Self {
        let mut aliases = aliases;
        for target in 0..aliases.len() {
            for source in 0..aliases.len() {
                if source == target || aliases[source].name.is_empty() {
                    continue;
                }
                if aliases[target].path.contains(&aliases[source].name) {
                    let rewritten = aliases[target]
                        .path
                        .replace(&aliases[source].name, &aliases[source].path);
                    aliases[target].path = rewritten;
                }
            }
        }
        Self { aliases }
    }

    /// Replace every occurrence of every alias name in `text`, in table order.
    pub fn resolve(&self, text: &str) -> String {
        self.aliases
            .iter()
            .filter(|alias| !alias.name.is_empty())
            .fold(text.to_string(), |acc, alias| {
                acc.replace(&alias.name, &alias.path)
            })
    }

    /// A copy of this table with `alias` placed first, shadowing every later
    /// alias of the same name.
    pub fn with_front(&self, alias: Alias) -> Self {
        let mut aliases = Vec::with_capacity(self.aliases.len() + 1);
        aliases.push(alias);
        aliases.extend(self.aliases.iter().cloned());
        Self { aliases }
    }

    /// Aliases to fan out over for `pattern`.
    ///
    /// Collects the aliases whose name occurs in `pattern`, orders them by
    /// first occurrence (ties keep table order), and returns every alias that
    /// shares the name of the earliest one. Other alias tokens in `pattern`
    /// are only substituted, never fanned out.
    pub fn variants_for(&self, pattern: &str) -> Vec<&Alias> {
        let mut found: Vec<(usize, &Alias)> = self
            .aliases
            .iter()
            .filter(|alias| !alias.name.is_empty())
            .filter_map(|alias| pattern.find(&alias.name).map(|pos| (pos, alias)))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);

        let Some((_, first)) = found.first() else {
            return Vec::new();
        };
        let name = first.name.as_str();
        found
            .iter()
            .filter(|(_, alias)| alias.name == name)
            .map(|(_, alias)| *alias)
            .collect()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.iter()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> AliasTable {
        AliasTable::new(pairs.iter().map(|(n, p)| Alias::new(*n, *p)).collect())
    }

    #[test]
    fn test_resolve_replaces_all_occurrences() {
        let t = table(&[("%a%", "x")]);
        assert_eq!(t.resolve("%a%/b/%a%"), "x/b/x");
        assert_eq!(t.resolve("plain"), "plain");
    }

    #[test]
    fn test_resolve_order_independent_without_overlap() {
        let forward = table(&[("%icons%", "res/icons"), ("%out%", "build")]);
        let backward = table(&[("%out%", "build"), ("%icons%", "res/icons")]);
        let text = "%icons%/*.svg -> %out%/*.png";
        assert_eq!(forward.resolve(text), backward.resolve(text));
        assert_eq!(forward.resolve(text), "res/icons/*.svg -> build/*.png");
    }

    #[test]
    fn test_resolve_earlier_alias_wins_on_overlap() {
        // "%img" is a substring of "%img2%".
        let short_first = table(&[("%img", "A"), ("%img2%", "B")]);
        let long_first = table(&[("%img2%", "B"), ("%img", "A")]);

        assert_eq!(short_first.resolve("%img2%/x"), "A2%/x");
        assert_eq!(long_first.resolve("%img2%/x"), "B/x");
    }

    #[test]
    fn test_prepare_single_pass() {
        let t = AliasTable::prepare(vec![
            Alias::new("%res%", "%root%/res"),
            Alias::new("%root%", "app"),
        ]);
        let paths: Vec<_> = t.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["app/res", "app"]);
    }

    #[test]
    fn test_prepare_uses_current_values() {
        let t = AliasTable::prepare(vec![
            Alias::new("%root%", "%base%/app"),
            Alias::new("%base%", "/srv"),
            Alias::new("%res%", "%root%/res"),
        ]);
        let paths: Vec<_> = t.iter().map(|a| a.path.as_str()).collect();
        // %res% sees the already rewritten %root%.
        assert_eq!(paths, vec!["/srv/app", "/srv", "/srv/app/res"]);
    }

    #[test]
    fn test_prepare_cycle_is_partial_and_deterministic() {
        let aliases = vec![Alias::new("%a%", "x/%b%"), Alias::new("%b%", "y/%a%")];
        let first = AliasTable::prepare(aliases.clone());
        let second = AliasTable::prepare(aliases);

        assert_eq!(first, second);
        let paths: Vec<_> = first.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["x/y/%a%", "y/x/y/%a%"]);
    }

    #[test]
    fn test_variants_for_first_token_group() {
        let t = table(&[
            ("%out%", "build"),
            ("%res%", "res/a"),
            ("%res%", "res/b"),
            ("%lang%", "en"),
        ]);

        let variants = t.variants_for("%lang%/%res%/*.png");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].path, "en");

        let variants = t.variants_for("%res%/%lang%/*.png");
        let paths: Vec<_> = variants.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["res/a", "res/b"]);

        assert!(t.variants_for("plain/*.png").is_empty());
    }

    #[test]
    fn test_with_front_shadows_same_name() {
        let t = table(&[("%res%", "res/a"), ("%res%", "res/b")]);
        let shadowed = t.with_front(Alias::new("%res%", "res/b"));
        assert_eq!(shadowed.len(), 3);
        assert_eq!(shadowed.resolve("%res%/x"), "res/b/x");
    }
}
