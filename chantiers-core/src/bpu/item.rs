use super::Article;
use chrono::NaiveDate;
use std::fmt;

/// A unit of work counted against a catalog article
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Tirage, Racco, Mesures
    pub activity: String,
    /// PT name, troncon name
    pub name: String,
    pub info: String,
    /// Monday of the week the work was done
    pub date: Option<NaiveDate>,
    pub article: Article,
    pub quantity: i64,
    pub todo: bool,
    pub done: bool,
}

impl Item {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        activity: &str,
        name: &str,
        info: impl Into<String>,
        date: Option<NaiveDate>,
        article: &Article,
        quantity: i64,
        todo: bool,
        done: bool,
    ) -> Self {
        Self {
            activity: activity.to_string(),
            name: name.to_string(),
            info: info.into(),
            date,
            article: article.clone(),
            quantity,
            todo,
            done,
        }
    }

    /// Done at or before the given week
    pub fn done_by(&self, week: NaiveDate) -> bool {
        self.done && self.date.is_some_and(|d| d <= week)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {} x{}",
            self.activity, self.name, self.info, self.article.name, self.quantity
        )?;
        if let Some(date) = self.date {
            write!(f, " done {}", date.format("%Y-%m-%d"))?;
        } else if !self.todo {
            write!(f, " (not to do)")?;
        }
        Ok(())
    }
}
