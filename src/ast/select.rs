use crate::ast::{Collection, Cte, Identifier, Join, OrderBy, Predicate, Query, ScalarExpr, write_list};
use std::fmt;

#[derive(Debug, Default, Clone, PartialEq)]
pub enum Distinct {
    #[default]
    None,
    All,
    On(Vec<ScalarExpr>),
}

impl Distinct {
    pub fn is_distinct(&self) -> bool {
        !matches!(self, Distinct::None)
    }
}

// WITH c AS (...)
// SELECT DISTINCT b.*, a.full_name AS name, COUNT(*) AS tot
// FROM TableA a, (SELECT ...) q
// INNER JOIN TableB b ON a.id = b.id
// WHERE ... GROUP BY ... HAVING ... ORDER BY ... LIMIT ... OFFSET ...
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    pub with: Vec<Cte>,
    pub distinct: Distinct,
    pub projection: Vec<Identifier>,
    pub collections: Vec<Collection>,
    pub joins: Vec<Join>,
    pub criteria: Option<Predicate>,
    pub group_by: Vec<ScalarExpr>,
    pub having: Option<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, expression: ScalarExpr) -> Self {
        self.projection.push(Identifier::new(expression));
        self
    }

    pub fn project_as(mut self, expression: ScalarExpr, alias: impl Into<String>) -> Self {
        self.projection.push(Identifier::aliased(expression, alias));
        self
    }

    pub fn project_all(self) -> Self {
        self.project(ScalarExpr::WildCard)
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = Distinct::All;
        self
    }

    pub fn distinct_on(mut self, exprs: Vec<ScalarExpr>) -> Self {
        self.distinct = Distinct::On(exprs);
        self
    }

    pub fn from(mut self, collection: Collection) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn from_table(self, name: impl Into<String>) -> Self {
        self.from(Collection::table(name))
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.criteria = Some(predicate);
        self
    }

    pub fn group_by(mut self, expr: ScalarExpr) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with(mut self, cte: Cte) -> Self {
        self.with.push(cte);
        self
    }
}

impl From<Select> for Query {
    fn from(value: Select) -> Self {
        Query::Select(Box::new(value))
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Cte::write_with(f, &self.with)?;
        f.write_str("SELECT ")?;
        match &self.distinct {
            Distinct::None => {}
            Distinct::All => f.write_str("DISTINCT ")?,
            Distinct::On(exprs) => {
                f.write_str("DISTINCT ON (")?;
                write_list(f, exprs)?;
                f.write_str(") ")?;
            }
        }
        write_list(f, &self.projection)?;
        if !self.collections.is_empty() {
            f.write_str(" FROM ")?;
            write_list(f, &self.collections)?;
        }
        for join in &self.joins {
            write!(f, " {}", join)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.order_by)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Collection, ComparatorOp, Cte, Join, OrderBy, Predicate, ScalarExpr, Select};

    #[test]
    pub fn test_select() {
        let select = Select::new()
            .project(ScalarExpr::WildCardWithCollection("b".into()))
            .project_as(ScalarExpr::qualified("a", "full_name"), "name")
            .project_as(ScalarExpr::function("COUNT", vec![ScalarExpr::WildCard]), "TotBy")
            .from(Collection::table_as("TableA", "A"))
            .from(Collection::table("OtherTable"))
            .join(Join::inner(
                Collection::table_as("TableB", "B"),
                Predicate::eq(ScalarExpr::qualified("A", "id"), ScalarExpr::qualified("B", "id")),
            ))
            .filter(Predicate::compare(ScalarExpr::qualified("A", "Age"), ComparatorOp::Gt, ScalarExpr::int(16)))
            .group_by(ScalarExpr::qualified("a", "full_name"))
            .having(Predicate::compare(ScalarExpr::function("COUNT", vec![ScalarExpr::WildCard]), ComparatorOp::Gt, ScalarExpr::int(3)))
            .order_by(OrderBy::desc(ScalarExpr::qualified("b", "description")))
            .limit(20)
            .offset(60);

        assert_eq!(
            select.to_string(),
            "SELECT b.*, a.full_name AS name, COUNT(*) AS TotBy FROM TableA AS A, OtherTable \
             JOIN TableB AS B ON A.id = B.id WHERE A.Age > 16 GROUP BY a.full_name \
             HAVING COUNT(*) > 3 ORDER BY b.description DESC LIMIT 20 OFFSET 60"
        );
    }

    #[test]
    pub fn test_select_distinct_on_and_with() {
        let select = Select::new()
            .with(Cte::new("c", Select::new().project_all().from_table("x")))
            .distinct_on(vec![ScalarExpr::column("a")])
            .project(ScalarExpr::column("a"))
            .project(ScalarExpr::column("b"))
            .from_table("c");

        assert_eq!(select.to_string(), "WITH c AS (SELECT * FROM x) SELECT DISTINCT ON (a) a, b FROM c");
    }

    #[test]
    pub fn test_select_without_from() {
        let select = Select::new().distinct().project(ScalarExpr::int(1));

        assert_eq!(select.to_string(), "SELECT DISTINCT 1");
    }
}
