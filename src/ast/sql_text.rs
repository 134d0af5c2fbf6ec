use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static PLAIN_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// Writes `name` as a SQL identifier, double-quoting it when it is not a plain word.
pub fn write_identifier(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if PLAIN_IDENTIFIER.is_match(name) {
        f.write_str(name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    }
}

/// Writes a possibly dotted name (`catalog.db.table`) one part at a time.
pub fn write_dotted(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    for (i, part) in name.split('.').enumerate() {
        if i > 0 {
            f.write_str(".")?;
        }
        write_identifier(f, part)?;
    }
    Ok(())
}

pub fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

pub fn write_identifier_list(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_identifier(f, name)?;
    }
    Ok(())
}

/// `AS alias(c1, c2)` suffix shared by every aliased source.
pub fn write_source_alias(f: &mut fmt::Formatter<'_>, alias: Option<&str>, column_aliases: &[String]) -> fmt::Result {
    if let Some(alias) = alias {
        f.write_str(" AS ")?;
        write_identifier(f, alias)?;
    }
    if !column_aliases.is_empty() {
        f.write_str("(")?;
        write_identifier_list(f, column_aliases)?;
        f.write_str(")")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    struct Ident(&'static str);

    impl fmt::Display for Ident {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_identifier(f, self.0)
        }
    }

    struct Dotted(&'static str);

    impl fmt::Display for Dotted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_dotted(f, self.0)
        }
    }

    #[test]
    fn test_plain_identifier_is_not_quoted() {
        assert_eq!(Ident("full_name").to_string(), "full_name");
        assert_eq!(Ident("_q_0").to_string(), "_q_0");
        assert_eq!(Ident("_").to_string(), "_");
    }

    #[test]
    fn test_identifier_with_space_is_quoted() {
        assert_eq!(Ident("full name").to_string(), "\"full name\"");
        assert_eq!(Ident("9lives").to_string(), "\"9lives\"");
        assert_eq!(Ident("say \"hi\"").to_string(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_dotted_name() {
        assert_eq!(Dotted("db.orders").to_string(), "db.orders");
        assert_eq!(Dotted("db.my table").to_string(), "db.\"my table\"");
    }
}
