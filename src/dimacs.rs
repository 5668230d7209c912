//! Reader for the DIMACS CNF format.
//!
//! ```text
//! c comment
//! p cnf 3 2
//! 1 -3 0
//! 2 3 -1 0
//! ```

use std::io::BufRead;

use crate::{Error, Formula, Lit, Result};

/// Reads a formula, checking that every literal lies within the declared
/// variable count.
pub fn parse<R: BufRead>(reader: R) -> Result<Formula> {
    let mut header: Option<(usize, usize)> = None;
    let mut formula = Formula::default();
    let mut clause = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        let text = line.trim();

        if text.is_empty() || text.starts_with('c') {
            continue;
        }
        // SATLIB files end with a '%' line.
        if text.starts_with('%') {
            break;
        }
        if text.starts_with('p') {
            if header.is_some() {
                return Err(invalid_header(lineno, text));
            }
            let (num_vars, num_clauses) = parse_header(lineno, text)?;
            debug!("Problem line: {} variables, {} clauses", num_vars, num_clauses);
            formula = Formula::new(num_vars);
            header = Some((num_vars, num_clauses));
            continue;
        }

        let num_vars = match header {
            Some((num_vars, _)) => num_vars,
            None => return Err(Error::ClauseBeforeHeader { line: lineno }),
        };
        for token in text.split_whitespace() {
            let lit = token.parse::<i64>().map_err(|_| {
                Error::InvalidLiteral { line: lineno, token: token.to_string() }
            })?;
            if lit == 0 {
                formula.add_clause(&clause);
                clause.clear();
            } else if lit.unsigned_abs() > num_vars as u64 {
                return Err(Error::VariableOutOfRange { line: lineno, lit, num_vars });
            } else {
                clause.push(Lit::from_dimacs(lit));
            }
        }
    }

    let (_, expected) = header.ok_or(Error::MissingHeader)?;
    if !clause.is_empty() {
        warn!("Last clause is not terminated by 0; keeping it");
        formula.add_clause(&clause);
    }
    if formula.clauses().len() != expected {
        warn!("Problem line announces {} clauses, found {}",
              expected,
              formula.clauses().len());
    }
    Ok(formula)
}

pub fn parse_str(input: &str) -> Result<Formula> {
    parse(input.as_bytes())
}

fn parse_header(line: usize, text: &str) -> Result<(usize, usize)> {
    let tokens = text.split_whitespace().collect::<Vec<_>>();
    match tokens[..] {
        ["p", "cnf", vars, clauses] => {
            match (vars.parse(), clauses.parse()) {
                (Ok(vars), Ok(clauses)) => Ok((vars, clauses)),
                _ => Err(invalid_header(line, text)),
            }
        }
        _ => Err(invalid_header(line, text)),
    }
}

fn invalid_header(line: usize, text: &str) -> Error {
    Error::InvalidHeader { line, text: text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::parse_str;
    use crate::{Error, Lit};

    #[test]
    fn parses_clauses_and_comments() {
        let f = parse_str("c a comment\n\
                           p cnf 3 2\n\
                           1 -3 0\n\
                           c another\n\
                           2 3 -1 0\n")
            .expect("valid input");
        assert_eq!(f.num_vars(), 3);
        assert_eq!(f.clauses().len(), 2);
        assert_eq!(f.clauses()[0].lits(), &[Lit::pos(1), Lit::neg(3)]);
        assert_eq!(f.clauses()[1].to_string(), "(2 V 3 V -1)");
    }

    #[test]
    fn clauses_may_span_lines() {
        let f = parse_str("p cnf 4 2\n1 2\n3 0 -4\n0\n").expect("valid input");
        assert_eq!(f.clauses()[0].len(), 3);
        assert_eq!(f.clauses()[1].lits(), &[Lit::neg(4)]);
    }

    #[test]
    fn keeps_an_unterminated_last_clause() {
        let f = parse_str("p cnf 2 2\n1 0\n-1 2").expect("valid input");
        assert_eq!(f.clauses().len(), 2);
    }

    #[test]
    fn stops_at_percent_line() {
        let f = parse_str("p cnf 2 1\n1 2 0\n%\n0\n").expect("valid input");
        assert_eq!(f.clauses().len(), 1);
    }

    #[test]
    fn lone_zero_is_an_empty_clause() {
        let f = parse_str("p cnf 1 1\n0\n").expect("valid input");
        assert!(f.clauses()[0].is_empty());
    }

    #[test]
    fn requires_a_problem_line() {
        match parse_str("c nothing here\n") {
            Err(Error::MissingHeader) => {}
            other => panic!("unexpected: {:?}", other),
        }
        match parse_str("1 2 0\np cnf 2 1\n") {
            Err(Error::ClauseBeforeHeader { line: 1 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_problem_lines() {
        match parse_str("p dnf 2 1\n") {
            Err(Error::InvalidHeader { line: 1, .. }) => {}
            other => panic!("unexpected: {:?}", other),
        }
        match parse_str("p cnf two 1\n") {
            Err(Error::InvalidHeader { .. }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_literals() {
        match parse_str("p cnf 2 1\n1 x 0\n") {
            Err(Error::InvalidLiteral { line: 2, ref token }) if token == "x" => {}
            other => panic!("unexpected: {:?}", other),
        }
        match parse_str("p cnf 2 1\n1 -3 0\n") {
            Err(Error::VariableOutOfRange { line: 2, lit: -3, num_vars: 2 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }
}
