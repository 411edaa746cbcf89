use crate::ingot::{bool_token, Ingot};

/// Serialize an ingot to its single-line canonical text form
///
/// Field order and quoting are fixed; consumers parse this text.
pub fn to_canonical_text(ingot: &Ingot) -> String {
    format!(
        "(ingot :id \"{}\" :status {} :solo {} :grade {} :skill {} :heat {} :max {} :proof \"{}\" :work \"{}\")",
        quote_escape(&ingot.id),
        ingot.status,
        bool_token(ingot.solo),
        ingot.grade,
        ingot.skill,
        ingot.heat,
        ingot.max,
        quote_escape(&ingot.proof),
        quote_escape(&ingot.work),
    )
}

/// Escape double quote and newline inside a quoted value; backslashes are
/// written as-is
fn quote_escape(s: &str) -> String {
    if !s.contains(['"', '\n']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingot::{example_ingots, Status};

    #[test]
    fn test_first_example_literal() {
        let ingot = &example_ingots()[0];
        assert_eq!(
            to_canonical_text(ingot),
            r#"(ingot :id "i1" :status ore :solo t :grade 1 :skill default :heat 0 :max 5 :proof "test -f package.json" :work "Initialize project with package.json and git repo")"#
        );
    }

    #[test]
    fn test_sequential_ingot_uses_nil() {
        let ingot = Ingot {
            id: "i5".into(),
            status: Status::Cracked,
            solo: false,
            grade: 4,
            skill: "cli".into(),
            heat: 6,
            max: 8,
            proof: "npm test".into(),
            work: "Deploy app".into(),
        };
        let s = to_canonical_text(&ingot);
        assert!(s.contains(":solo nil"));
        assert!(s.contains(":status cracked"));
        assert!(!s.contains("true"));
        assert!(!s.contains("false"));
    }

    #[test]
    fn test_field_order_is_fixed() {
        let s = to_canonical_text(&example_ingots()[3]);
        let keys: Vec<&str> = s
            .split_whitespace()
            .filter(|tok| tok.starts_with(':'))
            .collect();
        assert_eq!(
            keys,
            vec![":id", ":status", ":solo", ":grade", ":skill", ":heat", ":max", ":proof", ":work"]
        );
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let ingot = &example_ingots()[1];
        assert_eq!(to_canonical_text(ingot), to_canonical_text(ingot));
    }

    #[test]
    fn test_single_quotes_stay_verbatim() {
        let s = to_canonical_text(&example_ingots()[1]);
        assert!(s.contains(r#":proof "test -f index.html && grep -q 'viewport' index.html""#));
    }

    #[test]
    fn test_quotes_and_newlines_are_escaped() {
        let mut ingot = example_ingots().remove(0);
        ingot.work = "say \"hi\"\nthen exit".into();
        let s = to_canonical_text(&ingot);
        assert!(s.ends_with(r#":work "say \"hi\"\nthen exit")"#));
        assert_eq!(s.lines().count(), 1);
    }

    #[test]
    fn test_backslashes_stay_verbatim() {
        let mut ingot = example_ingots().remove(0);
        ingot.proof = r"grep -q 'a\|b' f".into();
        ingot.work = r"C:\build\out".into();
        let s = to_canonical_text(&ingot);
        assert!(s.contains(r#":proof "grep -q 'a\|b' f""#));
        assert!(s.ends_with(r#":work "C:\build\out")"#));
    }

    #[test]
    fn test_out_of_range_heat_passes_through() {
        let mut ingot = example_ingots().remove(0);
        ingot.heat = 12;
        ingot.max = 5;
        assert!(to_canonical_text(&ingot).contains(":heat 12 :max 5"));
    }
}
