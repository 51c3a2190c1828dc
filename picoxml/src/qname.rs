// SPDX-License-Identifier: Apache-2.0

/// A tag or attribute name split at its first colon.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct QName<'a> {
    /// Portion before the colon, empty when there is none
    pub prefix: &'a str,
    /// Portion after the colon, or the whole name
    pub local_name: &'a str,
}

impl<'a> QName<'a> {
    pub fn split(raw: &'a str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local_name)) => Self { prefix, local_name },
            None => Self {
                prefix: "",
                local_name: raw,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_name() {
        let name = QName::split("cpp:directive");
        assert_eq!(name.prefix, "cpp");
        assert_eq!(name.local_name, "directive");
    }

    #[test]
    fn test_unprefixed_name() {
        let name = QName::split("unit");
        assert_eq!(name.prefix, "");
        assert_eq!(name.local_name, "unit");
    }

    #[test]
    fn test_only_first_colon_splits() {
        let name = QName::split("a:b:c");
        assert_eq!(name.prefix, "a");
        assert_eq!(name.local_name, "b:c");
    }

    #[test]
    fn test_edge_colons() {
        assert_eq!(
            QName::split(":x"),
            QName {
                prefix: "",
                local_name: "x"
            }
        );
        assert_eq!(
            QName::split("x:"),
            QName {
                prefix: "x",
                local_name: ""
            }
        );
    }
}
