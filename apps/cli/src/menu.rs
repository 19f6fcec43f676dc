//! Line-based interactive menu.
//!
//! All terminal I/O goes through [`Prompter`], which is generic over its
//! reader and writer so the menu flow can be driven from tests.

use std::io::{self, BufRead, Write};

use descenhancer_core::CategoryIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MainChoice {
    Products,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProductChoice {
    All,
    ByCategory,
    Back,
}

pub(crate) struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line.
    pub(crate) fn say(&mut self, line: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Show `prompt` and read one trimmed line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub(crate) fn main_menu(&mut self) -> io::Result<MainChoice> {
        loop {
            self.say("Please choose what you want to improve:")?;
            self.say("1. Products")?;
            self.say("2. Exit")?;

            match self.ask("Enter your choice: ")?.as_deref() {
                Some("1") => return Ok(MainChoice::Products),
                Some("2") | None => return Ok(MainChoice::Exit),
                Some(_) => self.say("Invalid choice, please try again.")?,
            }
        }
    }

    pub(crate) fn product_menu(&mut self) -> io::Result<ProductChoice> {
        loop {
            self.say("Product Improvement Options:")?;
            self.say("1. Improve all products")?;
            self.say("2. Improve products by category")?;
            self.say("3. Back to main menu")?;

            match self.ask("Enter your choice: ")?.as_deref() {
                Some("1") => return Ok(ProductChoice::All),
                Some("2") => return Ok(ProductChoice::ByCategory),
                Some("3") | None => return Ok(ProductChoice::Back),
                Some(_) => self.say("Invalid choice, please try again.")?,
            }
        }
    }

    /// Render the indexed tree and read a pick until it resolves.
    ///
    /// Non-numeric and out-of-range input re-prompt. `None` at end of input.
    pub(crate) fn choose_category<'i>(
        &mut self,
        index: &'i CategoryIndex,
    ) -> io::Result<Option<&'i str>> {
        write!(self.output, "{}", index.render())?;

        loop {
            let Some(answer) = self.ask("Choose a category (number): ")? else {
                return Ok(None);
            };

            let chosen = match answer.parse::<usize>() {
                Ok(n) => n,
                Err(_) => {
                    self.say(format!("'{answer}' is not a number, please try again."))?;
                    continue;
                }
            };

            match index.resolve(chosen) {
                Ok(label) => return Ok(Some(label)),
                Err(e) if e.is_recoverable() => self.say(format!("{e}, please try again."))?,
                Err(e) => return Err(io::Error::other(e)),
            }
        }
    }

    /// Ask the operator to approve a run over `count` products.
    ///
    /// Only `yes` (any case, surrounding whitespace ignored) proceeds.
    pub(crate) fn confirm(&mut self, count: usize) -> io::Result<bool> {
        self.say(format!(
            "This action will enhance {count} products. Are you sure you want to proceed? (yes/no)"
        ))?;
        let answer = self.ask("")?;
        Ok(answer.is_some_and(|a| a.eq_ignore_ascii_case("yes")))
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.output
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use descenhancer_shared::ProductRecord;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(p: Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_output()).unwrap()
    }

    fn index() -> CategoryIndex {
        let records: Vec<ProductRecord> = ["Outdoor/Signs", "Outdoor/Fences", "Indoor/Signs"]
            .iter()
            .map(|p| ProductRecord::new("p", "", "", *p))
            .collect();
        CategoryIndex::build(&records).unwrap()
    }

    #[test]
    fn main_menu_reprompts_on_invalid_choice() {
        let mut p = prompter("7\nproducts\n1\n");
        assert_eq!(p.main_menu().unwrap(), MainChoice::Products);

        let out = output(p);
        assert_eq!(out.matches("Invalid choice, please try again.").count(), 2);
        assert_eq!(out.matches("1. Products").count(), 3);
    }

    #[test]
    fn end_of_input_exits() {
        assert_eq!(prompter("").main_menu().unwrap(), MainChoice::Exit);
        assert_eq!(prompter("").product_menu().unwrap(), ProductChoice::Back);
    }

    #[test]
    fn product_menu_choices() {
        assert_eq!(prompter(" 1 \n").product_menu().unwrap(), ProductChoice::All);
        assert_eq!(prompter("2\n").product_menu().unwrap(), ProductChoice::ByCategory);
        assert_eq!(prompter("x\n3\n").product_menu().unwrap(), ProductChoice::Back);
    }

    #[test]
    fn choose_category_renders_tree_and_resolves() {
        let index = index();
        let mut p = prompter("2\n");
        assert_eq!(p.choose_category(&index).unwrap(), Some("Signs"));

        let out = output(p);
        assert!(out.starts_with("1. Outdoor\n2.   Signs\n3.   Fences\n4. Indoor\n5.   Signs\n"));
    }

    #[test]
    fn choose_category_reprompts_until_valid() {
        let index = index();
        let mut p = prompter("abc\n0\n6\n-1\n4\n");
        assert_eq!(p.choose_category(&index).unwrap(), Some("Indoor"));

        let out = output(p);
        assert!(out.contains("'abc' is not a number"));
        assert!(out.contains("selection 0 is out of range (choose 1 to 5)"));
        assert!(out.contains("selection 6 is out of range (choose 1 to 5)"));
        assert!(out.contains("'-1' is not a number"));
    }

    #[test]
    fn choose_category_at_end_of_input() {
        let index = index();
        assert_eq!(prompter("9\n").choose_category(&index).unwrap(), None);
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let mut p = prompter("  YES \n");
        assert!(p.confirm(3).unwrap());
        assert!(output(p).contains(
            "This action will enhance 3 products. Are you sure you want to proceed? (yes/no)"
        ));

        assert!(prompter("Yes\n").confirm(1).unwrap());
        for answer in ["y\n", "no\n", "yes please\n", "\n", ""] {
            assert!(!prompter(answer).confirm(1).unwrap(), "{answer:?} confirmed");
        }
    }
}
