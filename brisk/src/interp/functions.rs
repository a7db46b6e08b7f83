//! Function and lambda metadata
//!
//! A single pass over the tokenized program registers every named function
//! and every lambda (under a synthetic `lambda@<line>` key) and records, for
//! each line, the declared return type of the nearest enclosing function and
//! of the nearest enclosing lambda.

use super::error::{InterpResult, RuntimeError};
use super::types::DeclaredType;
use crate::lexer::{kw, TokenizedProgram};
use std::collections::HashMap;
use std::fmt;

/// Index of a signature in the [`FunctionTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(usize);

/// One formal parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: DeclaredType,
}

/// Immutable signature shared by named functions and lambdas
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    /// Declared name, or `lambda@<line>` for lambdas
    pub name: String,
    pub params: Vec<Param>,
    /// First executable line of the body
    pub start_line: usize,
    pub return_type: DeclaredType,
}

impl FunctionSignature {
    pub fn is_lambda(&self) -> bool {
        self.name.starts_with(LAMBDA_PREFIX)
    }

    /// Line holding the `func`/`lambda` header
    pub fn definition_line(&self) -> usize {
        self.start_line - 1
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", p.name, p.ty)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

const LAMBDA_PREFIX: &str = "lambda@";

/// Name -> signature table plus the per-line return type indices
#[derive(Debug, Default)]
pub struct FunctionTable {
    signatures: Vec<FunctionSignature>,
    by_name: HashMap<String, FuncId>,
    /// Object field names that were assigned a function value
    field_aliases: HashMap<String, FuncId>,
    function_returns: Vec<Option<DeclaredType>>,
    lambda_returns: Vec<Option<DeclaredType>>,
}

impl FunctionTable {
    /// Synthetic key for the lambda defined on `line`
    pub fn lambda_name(line: usize) -> String {
        format!("{LAMBDA_PREFIX}{line}")
    }

    /// Build the table in one pass over the program
    pub fn resolve(program: &TokenizedProgram) -> InterpResult<Self> {
        let mut table = FunctionTable::default();
        let mut function_stack: Vec<Option<DeclaredType>> = vec![None];
        let mut lambda_stack: Vec<Option<DeclaredType>> = vec![None];

        for (line, tokens) in program.tokens.iter().enumerate() {
            let keyword = tokens.first().map(String::as_str);

            match keyword {
                Some(kw::FUNC) => {
                    let (name, rest) = match tokens.get(1..) {
                        Some([name, rest @ ..]) if !rest.is_empty() => (name, rest),
                        _ => {
                            return Err(RuntimeError::syntax_error(
                                "function definition needs a name and a return type",
                            )
                            .at_line(line));
                        }
                    };
                    let signature = parse_signature(name.clone(), rest, line)?;
                    function_stack.push(Some(signature.return_type));
                    table.register(signature).map_err(|e| e.at_line(line))?;
                }
                Some(kw::LAMBDA) => {
                    if tokens.len() < 2 {
                        return Err(
                            RuntimeError::syntax_error("lambda definition needs a return type")
                                .at_line(line),
                        );
                    }
                    let signature = parse_signature(Self::lambda_name(line), &tokens[1..], line)?;
                    lambda_stack.push(Some(signature.return_type));
                    table.register(signature).map_err(|e| e.at_line(line))?;
                }
                _ => {}
            }

            // The end marker line still belongs to the block it closes
            table.function_returns.push(function_stack.last().copied().flatten());
            table.lambda_returns.push(lambda_stack.last().copied().flatten());

            match keyword {
                Some(kw::ENDFUNC) if function_stack.len() > 1 => {
                    function_stack.pop();
                }
                Some(kw::ENDLAMBDA) if lambda_stack.len() > 1 => {
                    lambda_stack.pop();
                }
                _ => {}
            }
        }

        tracing::debug!(
            functions = table.signatures.iter().filter(|s| !s.is_lambda()).count(),
            lambdas = table.signatures.iter().filter(|s| s.is_lambda()).count(),
            "resolved function metadata"
        );
        Ok(table)
    }

    fn register(&mut self, signature: FunctionSignature) -> InterpResult<()> {
        if self.by_name.contains_key(&signature.name) {
            return Err(RuntimeError::name_error(format!(
                "function `{}` is defined more than once",
                signature.name
            )));
        }
        let id = FuncId(self.signatures.len());
        self.by_name.insert(signature.name.clone(), id);
        self.signatures.push(signature);
        Ok(())
    }

    pub fn get(&self, id: FuncId) -> &FunctionSignature {
        &self.signatures[id.0]
    }

    /// Named function or lambda key
    pub fn lookup(&self, name: &str) -> Option<FuncId> {
        self.by_name.get(name).copied()
    }

    /// Named function only; lambda keys are not reachable from source
    pub fn lookup_named(&self, name: &str) -> Option<FuncId> {
        self.lookup(name).filter(|id| !self.get(*id).is_lambda())
    }

    /// Field name most recently assigned a function value on any object
    pub fn lookup_alias(&self, name: &str) -> Option<FuncId> {
        self.field_aliases.get(name).copied()
    }

    pub fn register_alias(&mut self, name: &str, id: FuncId) {
        self.field_aliases.insert(name.to_owned(), id);
    }

    pub fn clear_aliases(&mut self) {
        self.field_aliases.clear();
    }

    pub fn enclosing_function_return(&self, line: usize) -> Option<DeclaredType> {
        self.function_returns.get(line).copied().flatten()
    }

    pub fn enclosing_lambda_return(&self, line: usize) -> Option<DeclaredType> {
        self.lambda_returns.get(line).copied().flatten()
    }

    /// Declared function names, for suggestions
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signatures
            .iter()
            .filter(|s| !s.is_lambda())
            .map(|s| s.name.as_str())
    }

    pub fn signatures(&self) -> impl Iterator<Item = (FuncId, &FunctionSignature)> {
        self.signatures
            .iter()
            .enumerate()
            .map(|(i, s)| (FuncId(i), s))
    }
}

/// Parse `p1:t1 p2:t2 ... ret` into a signature starting on the next line
fn parse_signature(name: String, rest: &[String], line: usize) -> InterpResult<FunctionSignature> {
    let (ret, formals) = match rest.split_last() {
        Some(split) => split,
        None => {
            return Err(RuntimeError::syntax_error(format!("`{name}` is missing a return type")).at_line(line));
        }
    };

    let return_type = DeclaredType::parse(ret)
        .filter(|ty| ty.is_storable())
        .ok_or_else(|| RuntimeError::type_error(format!("invalid return type `{ret}`")).at_line(line))?;

    let params = formals
        .iter()
        .map(|formal| parse_param(formal).map_err(|e| e.at_line(line)))
        .collect::<InterpResult<Vec<_>>>()?;

    Ok(FunctionSignature {
        name,
        params,
        start_line: line + 1,
        return_type,
    })
}

fn parse_param(formal: &str) -> InterpResult<Param> {
    let (name, ty) = formal
        .split_once(':')
        .filter(|(name, ty)| !name.is_empty() && !ty.is_empty())
        .ok_or_else(|| {
            RuntimeError::syntax_error(format!("malformed parameter `{formal}`, expected name:type"))
        })?;
    if kw::is_reserved(name) {
        return Err(RuntimeError::syntax_error(format!(
            "`{name}` is a reserved word and cannot name a parameter"
        )));
    }
    let ty = DeclaredType::parse(ty)
        .filter(|ty| *ty != DeclaredType::Void)
        .ok_or_else(|| RuntimeError::type_error(format!("invalid parameter type `{ty}`")))?;
    Ok(Param {
        name: name.to_owned(),
        ty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;

    fn resolve(src: &str) -> InterpResult<FunctionTable> {
        FunctionTable::resolve(&TokenizedProgram::from_source(src))
    }

    #[test]
    fn test_registers_function_signature() {
        let table = resolve("func add a:int b:refint int\n  return + a b\nendfunc\n").unwrap();
        let sig = table.get(table.lookup("add").unwrap());
        assert_eq!(sig.start_line, 1);
        assert_eq!(sig.return_type, DeclaredType::Int);
        assert_eq!(
            sig.params,
            vec![
                Param { name: "a".into(), ty: DeclaredType::Int },
                Param { name: "b".into(), ty: DeclaredType::RefInt },
            ]
        );
        assert!(!sig.is_lambda());
    }

    #[test]
    fn test_lambda_uses_synthetic_key() {
        let src = "func main void\n  lambda x:int bool\n    return true\n  endlambda\nendfunc\n";
        let table = resolve(src).unwrap();
        let id = table.lookup("lambda@1").unwrap();
        let sig = table.get(id);
        assert!(sig.is_lambda());
        assert_eq!(sig.start_line, 2);
        assert_eq!(sig.definition_line(), 1);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["main"]);
    }

    #[test]
    fn test_per_line_indices_include_end_marker() {
        let src = "func main void\n  lambda int\n  endlambda\nendfunc\nfunc f string\nendfunc\n";
        let table = resolve(src).unwrap();

        assert_eq!(table.enclosing_function_return(0), Some(DeclaredType::Void));
        assert_eq!(table.enclosing_function_return(3), Some(DeclaredType::Void));
        assert_eq!(table.enclosing_function_return(4), Some(DeclaredType::Str));
        assert_eq!(table.enclosing_function_return(5), Some(DeclaredType::Str));

        assert_eq!(table.enclosing_lambda_return(0), None);
        assert_eq!(table.enclosing_lambda_return(1), Some(DeclaredType::Int));
        assert_eq!(table.enclosing_lambda_return(2), Some(DeclaredType::Int));
        assert_eq!(table.enclosing_lambda_return(3), None);
    }

    #[test]
    fn test_lines_outside_functions_have_no_return_type() {
        let table = resolve("# header\nfunc main void\nendfunc\n\n").unwrap();
        assert_eq!(table.enclosing_function_return(0), None);
        assert_eq!(table.enclosing_function_return(3), None);
        assert_eq!(table.enclosing_function_return(100), None);
    }

    #[test]
    fn test_malformed_parameter_is_syntax_error() {
        let err = resolve("func main void\nendfunc\nfunc f x int\nendfunc\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_reserved_parameter_name_is_syntax_error() {
        let err = resolve("func main void\nendfunc\nfunc f if:int void\nendfunc\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.line, Some(2));
        let err = resolve("func main void\n  lambda true:bool void\n  endlambda\nendfunc\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_unknown_types_are_type_errors() {
        let err = resolve("func f x:float int\nendfunc\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
        let err = resolve("func f refint\nendfunc\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_missing_return_type() {
        let err = resolve("func main\nendfunc\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        let err = resolve("  lambda\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_duplicate_function_is_name_error() {
        let err = resolve("func f void\nendfunc\nfunc f int\nendfunc\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Name);
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_field_alias_registration() {
        let mut table = resolve("func f void\nendfunc\n").unwrap();
        let id = table.lookup("f").unwrap();
        assert_eq!(table.lookup_alias("speak"), None);
        table.register_alias("speak", id);
        assert_eq!(table.lookup_alias("speak"), Some(id));
        table.clear_aliases();
        assert_eq!(table.lookup_alias("speak"), None);
    }

    #[test]
    fn test_lookup_named_skips_lambdas() {
        let src = "func main void\n  lambda int\n  endlambda\nendfunc\n";
        let table = resolve(src).unwrap();
        assert!(table.lookup("lambda@1").is_some());
        assert_eq!(table.lookup_named("lambda@1"), None);
        assert_eq!(table.lookup_named("main"), table.lookup("main"));
    }

    #[test]
    fn test_signature_display() {
        let table = resolve("func f a:int o:object string\nendfunc\n").unwrap();
        let sig = table.get(table.lookup("f").unwrap());
        assert_eq!(sig.to_string(), "f(a:int, o:object) -> string");
    }
}
