//! Compiles filter predicates into the store's expression syntax.
//!
//! A [`Filter`] is an ordered list of clauses. [`Filter::compile`] walks the
//! clauses with a 1-based running index and emits one conjunctive expression
//! string plus the two placeholder maps the store expects
//! (`ExpressionAttributeNames` keyed `#attr{i}`, `ExpressionAttributeValues`
//! keyed `:val{i}` or `:val{i}_{j}` for multi-valued clauses). Compiled
//! expressions are built fresh per call and never cached.

use std::collections::HashMap;

use serde_json::Value;

use dynamap_model::types::{ExpressionAttributeNames, ExpressionAttributeValues, Item};

use crate::error::ModelError;

/// Operators that take a value list rather than a single operand.
const EXPRESSIONS: [&str; 2] = ["between", "in"];

/// Comparator operators and the symbols they compile to.
const COMPARATORS: [(&str, &str); 5] = [
    ("eq", "="),
    ("gt", ">"),
    ("lt", "<"),
    ("lte", "<="),
    ("gte", ">="),
];

/// Operators compiled as `operator(#attr, :val)` function calls.
const FUNCTIONS: [&str; 3] = ["attribute_type", "begins_with", "contains"];

fn comparator_symbol(operator: &str) -> Option<&'static str> {
    COMPARATORS
        .iter()
        .find(|(name, _)| *name == operator)
        .map(|(_, symbol)| *symbol)
}

fn is_function(operator: &str) -> bool {
    FUNCTIONS.contains(&operator)
}

fn is_expression(operator: &str) -> bool {
    EXPRESSIONS.contains(&operator)
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

/// One predicate over an attribute.
///
/// The operator is kept as a string and resolved at compile time so an
/// unrecognized operator can be reported with the attribute it was applied
/// to. For `between` and `in` the operand is an array; everything else takes
/// a single scalar which is passed through to the value map untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    /// Attribute name the predicate applies to.
    pub attribute: String,
    /// Operator name, e.g. `eq`, `contains`, `between`.
    pub operator: String,
    /// Operand value; an array for `between` and `in`.
    pub operand: Value,
}

impl FilterClause {
    /// Create a clause.
    pub fn new(
        attribute: impl Into<String>,
        operator: impl Into<String>,
        operand: impl Into<Value>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator: operator.into(),
            operand: operand.into(),
        }
    }
}

/// Result of compiling a filter: the expression string and its placeholder
/// maps, ready to merge into a scan request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledExpression {
    /// Conjunctive expression, clauses joined with `" and "`.
    pub filter_expression: String,
    /// `#attr{i}` placeholder to attribute name.
    pub expression_attribute_names: ExpressionAttributeNames,
    /// `:val{i}` / `:val{i}_{j}` placeholder to operand value.
    pub expression_attribute_values: ExpressionAttributeValues,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// An ordered list of filter clauses joined conjunctively.
///
/// Declaration order is significant: it fixes both the placeholder numbering
/// and the left-to-right structure of the compiled expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<FilterClause>,
}

impl Filter {
    /// An empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause, builder style.
    #[must_use]
    pub fn clause(
        mut self,
        attribute: impl Into<String>,
        operator: impl Into<String>,
        operand: impl Into<Value>,
    ) -> Self {
        self.clauses.push(FilterClause::new(attribute, operator, operand));
        self
    }

    /// Append a clause in place.
    pub fn push(&mut self, clause: FilterClause) {
        self.clauses.push(clause);
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the filter has no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The clauses in declaration order.
    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// Parse the tokenized string form `"attribute operator operand"`.
    ///
    /// The string form carries no type information, so operands are coerced:
    /// `between` and `in` operands are split on `,` with `between` parts
    /// parsed as floats; the pieces of an `in` list keep any whitespace
    /// around the commas verbatim. Single-valued operands stay strings.
    pub fn parse(input: &str) -> Result<Self, ModelError> {
        let mut parts = input.splitn(3, ' ');
        let (Some(attribute), Some(operator), Some(operand)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ModelError::MalformedClause {
                clause: input.to_owned(),
            });
        };

        let operand = match operator {
            "between" => {
                let bounds = operand
                    .split(',')
                    .map(|raw| raw.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| ModelError::MalformedClause {
                        clause: input.to_owned(),
                    })?;
                if bounds.len() != 2 {
                    return Err(ModelError::MalformedClause {
                        clause: input.to_owned(),
                    });
                }
                Value::from(bounds)
            }
            // In-lists are split but never trimmed; whitespace around the
            // commas ends up in the bound values.
            "in" => Value::from(operand.split(',').collect::<Vec<_>>()),
            _ => Value::from(operand),
        };

        Ok(Self::new().clause(attribute, operator, operand))
    }

    /// Compile the filter into the store's expression syntax.
    ///
    /// Fails with [`ModelError::UnsupportedOperator`] on the first operator
    /// outside the comparator/function/expression sets; nothing partial is
    /// returned. `between` and `in` additionally require an array operand
    /// (two elements for `between`) and fail with
    /// [`ModelError::MalformedClause`] otherwise.
    pub fn compile(&self) -> Result<CompiledExpression, ModelError> {
        let mut filter_expression = String::new();
        let mut names: ExpressionAttributeNames = HashMap::new();
        let mut values: ExpressionAttributeValues = HashMap::new();

        for (index, clause) in self.clauses.iter().enumerate() {
            let i = index + 1;
            if i > 1 {
                filter_expression.push_str(" and ");
            }

            if is_function(&clause.operator) {
                filter_expression
                    .push_str(&format!("{}(#attr{i}, :val{i})", clause.operator));
                names.insert(format!("#attr{i}"), clause.attribute.clone());
                values.insert(format!(":val{i}"), clause.operand.clone());
            } else if let Some(symbol) = comparator_symbol(&clause.operator) {
                filter_expression.push_str(&format!("#attr{i} {symbol} :val{i}"));
                names.insert(format!("#attr{i}"), clause.attribute.clone());
                values.insert(format!(":val{i}"), clause.operand.clone());
            } else if is_expression(&clause.operator) {
                compile_expression_clause(
                    clause,
                    i,
                    &mut filter_expression,
                    &mut names,
                    &mut values,
                )?;
            } else {
                return Err(ModelError::UnsupportedOperator {
                    attribute: clause.attribute.clone(),
                    operator: clause.operator.clone(),
                });
            }
        }

        Ok(CompiledExpression {
            filter_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
        })
    }
}

/// Compile a `between` or `in` clause, binding one placeholder per element.
fn compile_expression_clause(
    clause: &FilterClause,
    i: usize,
    filter_expression: &mut String,
    names: &mut ExpressionAttributeNames,
    values: &mut ExpressionAttributeValues,
) -> Result<(), ModelError> {
    let Some(elements) = clause.operand.as_array() else {
        return Err(ModelError::MalformedClause {
            clause: format!("{} {} {}", clause.attribute, clause.operator, clause.operand),
        });
    };

    match clause.operator.as_str() {
        "in" => {
            filter_expression.push_str(&format!("#attr{i} in( "));
            for (j, element) in elements.iter().enumerate() {
                if j > 0 {
                    filter_expression.push_str(", ");
                }
                filter_expression.push_str(&format!(":val{i}_{}", j + 1));
                values.insert(format!(":val{i}_{}", j + 1), element.clone());
            }
            filter_expression.push(')');
            names.insert(format!("#attr{i}"), clause.attribute.clone());
        }
        "between" => {
            let [lo, hi] = elements.as_slice() else {
                return Err(ModelError::MalformedClause {
                    clause: format!(
                        "{} {} {}",
                        clause.attribute, clause.operator, clause.operand
                    ),
                });
            };
            filter_expression.push_str(&format!("#attr{i} between :val{i} and :val{i}_1"));
            names.insert(format!("#attr{i}"), clause.attribute.clone());
            values.insert(format!(":val{i}"), lo.clone());
            values.insert(format!(":val{i}_1"), hi.clone());
        }
        _ => unreachable!("caller checked operator membership"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Update expressions
// ---------------------------------------------------------------------------

/// A compiled `SET` update expression with its placeholder maps.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// `SET #param1 = :val1, #param2 = :val2, ...`
    pub update_expression: String,
    /// `#param{i}` placeholder to attribute name.
    pub expression_attribute_names: ExpressionAttributeNames,
    /// `:val{i}` placeholder to new value.
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// Build a `SET` expression covering every field of the patch.
///
/// Placeholders are numbered `#param{i}` / `:val{i}` from 1 over the patch
/// fields in sorted attribute-name order, so the same patch always compiles
/// to the same expression text. An empty patch is rejected; there is nothing
/// to set and the store would reject a bare `SET`.
pub fn update_expression(patch: &Item) -> Result<UpdateExpression, ModelError> {
    if patch.is_empty() {
        return Err(ModelError::Validation {
            message: "update patch has no fields to set".to_owned(),
        });
    }

    let mut fields: Vec<(&String, &Value)> = patch.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let mut expression = String::from("SET ");
    let mut names: ExpressionAttributeNames = HashMap::new();
    let mut values: ExpressionAttributeValues = HashMap::new();

    for (index, (name, value)) in fields.into_iter().enumerate() {
        let i = index + 1;
        if i > 1 {
            expression.push_str(", ");
        }
        expression.push_str(&format!("#param{i} = :val{i}"));
        names.insert(format!("#param{i}"), name.clone());
        values.insert(format!(":val{i}"), value.clone());
    }

    Ok(UpdateExpression {
        update_expression: expression,
        expression_attribute_names: names,
        expression_attribute_values: values,
    })
}
