//! Source reconstruction.
//!
//! The output is a normalized form, not the original spelling: infix and
//! prefix expressions are fully parenthesized and statements end with `;`.
//! Literal text is written back verbatim, so a text-only program reproduces
//! its source exactly.

use std::fmt::{self, Display, Formatter};

use super::{
    Block, CallExpr, Expr, ForExpr, FunctionLiteral, HashLiteral, IfExpr, IndexExpr, Program,
    ReturnOrigin, Stmt,
};

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let(s) => write!(f, "let {} = {};", s.name.name, s.value),
            Stmt::Return(s) => match (&s.origin, &s.value) {
                (ReturnOrigin::Keyword, Some(v)) => write!(f, "return {v};"),
                (ReturnOrigin::Keyword, None) => f.write_str("return;"),
                (ReturnOrigin::Interpolation, Some(v)) => write!(f, "{v}"),
                (ReturnOrigin::Interpolation, None) => Ok(()),
            },
            Stmt::Expr(s) => write!(f, "{}", s.expr),
            Stmt::Block(b) => write!(f, "{b}"),
            Stmt::Assign(s) => write!(f, "{} = {};", s.name.name, s.value),
            Stmt::Break(_) => f.write_str("break"),
            Stmt::Continue(_) => f.write_str("continue"),
            Stmt::Hole(h) => write!(f, "hole({})", h.input.trim()),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(i) => f.write_str(&i.name),
            Expr::Int(i) => write!(f, "{}", i.value),
            Expr::Float(x) => write!(f, "{}", x.value),
            Expr::Str(s) => write!(f, "{:?}", s.value),
            Expr::Bool(b) => write!(f, "{}", b.value),
            Expr::Nil(_) => f.write_str("nil"),
            Expr::Text(t) => f.write_str(&t.value),
            Expr::Array(a) => {
                f.write_str("[")?;
                write_list(f, &a.elements)?;
                f.write_str("]")
            }
            Expr::Hash(h) => write!(f, "{h}"),
            Expr::Prefix(p) => write!(f, "({}{})", p.op.as_symbol(), p.right),
            Expr::Infix(i) => write!(f, "({} {} {})", i.left, i.op.as_symbol(), i.right),
            Expr::Index(i) => write!(f, "{i}"),
            Expr::Member(m) => write!(f, "{}.{}", m.object, m.name.name),
            Expr::Call(c) => write!(f, "{c}"),
            Expr::If(i) => write!(f, "{i}"),
            Expr::For(e) => write!(f, "{e}"),
            Expr::Function(func) => write!(f, "{func}"),
        }
    }
}

impl Display for HashLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

impl Display for IndexExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}[{}] = {}", self.left, self.index, v),
            None => write!(f, "({}[{}])", self.left, self.index),
        }
    }
}

impl Display for CallExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(callee) = &self.callee {
            write!(f, "{callee}.")?;
        }
        write!(f, "{}(", self.function)?;
        write_list(f, &self.arguments)?;
        f.write_str(")")?;
        if let Some(block) = &self.block {
            write!(f, " {{ {block} }}")?;
        }
        Ok(())
    }
}

impl Display for IfExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "if ({}) {{ {} }}", self.condition, self.consequence)?;
        for clause in &self.else_ifs {
            write!(f, " else if ({}) {{ {} }}", clause.condition, clause.block)?;
        }
        if let Some(alt) = &self.alternative {
            write!(f, " else {{ {alt} }}")?;
        }
        Ok(())
    }
}

impl Display for ForExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "for ({}", self.key.name)?;
        if let Some(value) = &self.value {
            write!(f, ", {}", value.name)?;
        }
        write!(f, ") in {} {{ {} }}", self.iterable, self.body)
    }
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&param.name)?;
        }
        write!(f, ") {{ {} }}", self.body)
    }
}
