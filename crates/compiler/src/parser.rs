//! Recursive-descent parser and semantic analysis for Mini-C.
//!
//! The parser owns the token cursor and both scope tables: the flat
//! global table and the locals of the function being parsed. All surface
//! sugar is folded here, before the emitter ever sees a node:
//!
//! - `>` / `>=` swap operands into `<` / `<=`
//! - unary `-x` becomes `0 - x`
//! - `lhs OP= rhs` routes the lvalue address through a hidden
//!   pointer-typed frame slot so `lhs` is evaluated exactly once
//! - `++x` / `--x` are `x += 1` / `x -= 1`; the postfix forms re-adjust
//!   the stored value (`x++` is `(x += 1) - 1`)
//! - `a[b]` becomes `*(a + b)`
//! - `+` and `-` over pointer-like operands scale their integer side by
//!   the slot width
//!
//! Scaling needs operand types before the whole tree exists, so the
//! annotation pass runs on sub-expressions during parsing.

use crate::ast::{
    BinaryOp, FuncDef, GlobalVar, Item, Node, NodeKind, Program, Variable,
};
use crate::error::CompileError;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::types::Type;
use crate::typing;

/// Upper bound on function definitions in one translation unit.
const MAX_FUNCS: usize = 100;

/// Scale applied to the integer operand of pointer arithmetic. Every
/// frame and element slot is 8 bytes, so the scale is 8 regardless of
/// the pointee type.
const PTR_SCALE: i64 = 8;

const COMPOUND_OPS: [(&str, BinaryOp); 5] = [
    ("+=", BinaryOp::Add),
    ("-=", BinaryOp::Sub),
    ("*=", BinaryOp::Mul),
    ("/=", BinaryOp::Div),
    ("%=", BinaryOp::Mod),
];

/// Scope of the function currently being parsed.
struct CurrentFn {
    name: String,
    ret_type: Type,
    param_count: usize,
    locals: Vec<Variable>,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    items: Vec<Item>,
    funcs: Vec<FuncDef>,
    globals: Vec<GlobalVar>,
    current_fn: Option<CurrentFn>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, CompileError> {
        Ok(Parser {
            tokens: tokenize(source)?,
            pos: 0,
            items: Vec::new(),
            funcs: Vec::new(),
            globals: Vec::new(),
            current_fn: None,
        })
    }

    pub fn parse(&mut self) -> Result<Program, CompileError> {
        while !self.at_eof() {
            if self.check_kind(TokenKind::Int) && self.looks_like_func_def() {
                self.parse_func_def()?;
            } else {
                let stmt = self.parse_statement()?;
                self.items.push(Item::Stmt(stmt));
            }
        }
        Ok(Program {
            items: std::mem::take(&mut self.items),
            funcs: std::mem::take(&mut self.funcs),
            globals: std::mem::take(&mut self.globals),
        })
    }

    /*** token cursor ***/

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn token_at(&self, index: usize) -> &Token {
        // the trailing Eof token absorbs any lookahead past the end
        self.tokens
            .get(index)
            .unwrap_or_else(|| &self.tokens[self.tokens.len() - 1])
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, op: &str) -> bool {
        self.peek().kind == TokenKind::Reserved && self.peek().text == op
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn consume(&mut self, op: &str) -> bool {
        if self.check(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn consume_kind(&mut self, kind: TokenKind) -> bool {
        if self.check_kind(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn consume_ident(&mut self) -> Option<Token> {
        if self.check_kind(TokenKind::Ident) {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    fn expect(&mut self, op: &str) -> Result<(), CompileError> {
        if self.consume(op) {
            Ok(())
        } else {
            Err(self.error_here(format!("Expected `{}`.", op)))
        }
    }

    fn expect_number(&mut self) -> Result<i64, CompileError> {
        if self.check_kind(TokenKind::Num) {
            let value = self.peek().value;
            self.pos += 1;
            Ok(value)
        } else {
            Err(self.error_here("Expected a number."))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> CompileError {
        CompileError::at(self.peek().offset, message)
    }

    /*** declarations and scope ***/

    /// True when the cursor sits on `int '*'* ident (`.
    fn looks_like_func_def(&self) -> bool {
        let mut index = self.pos + 1;
        while self.token_at(index).kind == TokenKind::Reserved && self.token_at(index).text == "*" {
            index += 1;
        }
        self.token_at(index).kind == TokenKind::Ident
            && self.token_at(index + 1).kind == TokenKind::Reserved
            && self.token_at(index + 1).text == "("
    }

    /// `int '*'*`
    fn parse_type_prefix(&mut self) -> Result<Type, CompileError> {
        if !self.consume_kind(TokenKind::Int) {
            return Err(self.error_here("Expected a type."));
        }
        let mut ty = Type::Int;
        while self.consume("*") {
            ty = Type::pointer_to(ty);
        }
        Ok(ty)
    }

    fn parse_func_def(&mut self) -> Result<(), CompileError> {
        let ret_type = self.parse_type_prefix()?;
        let name_tok = self
            .consume_ident()
            .ok_or_else(|| self.error_here("Expected an identifier."))?;
        if self.funcs.len() >= MAX_FUNCS {
            return Err(CompileError::at(
                name_tok.offset,
                "Too many function definitions.",
            ));
        }
        self.expect("(")?;

        let mut current = CurrentFn {
            name: name_tok.text.clone(),
            ret_type,
            param_count: 0,
            locals: Vec::new(),
        };
        if !self.consume(")") {
            loop {
                let param_ty = self.parse_type_prefix()?;
                let param_tok = self
                    .consume_ident()
                    .ok_or_else(|| self.error_here("Expected an identifier."))?;
                if current.locals.iter().any(|v| v.name == param_tok.text) {
                    return Err(CompileError::at(
                        param_tok.offset,
                        format!("Duplicate parameter `{}`.", param_tok.text),
                    ));
                }
                current.param_count += 1;
                let index = current.param_count as i64; // 1-indexed
                // the first six parameters land in ordinary frame slots;
                // the rest were pushed by the caller above the saved rbp
                let offset = if index <= 6 {
                    8 * index
                } else {
                    -(8 * (index - 7) + 16)
                };
                current.locals.push(Variable {
                    name: param_tok.text.clone(),
                    ty: param_ty,
                    offset,
                });
                if !self.consume(",") {
                    break;
                }
            }
            self.expect(")")?;
        }
        self.expect("{")?;

        self.current_fn = Some(current);
        let mut body = Vec::new();
        while !self.consume("}") {
            if self.at_eof() {
                return Err(self.error_here("Expected `}`."));
            }
            body.push(self.parse_statement()?);
        }
        let current = self.current_fn.take().expect("function scope present");

        let max_offset = current
            .locals
            .iter()
            .map(|v| v.offset)
            .filter(|&o| o > 0)
            .max()
            .unwrap_or(0);
        let frame_size = (max_offset + 15) / 16 * 16;

        let index = self.funcs.len();
        self.funcs.push(FuncDef {
            name: current.name,
            ret_type: current.ret_type,
            param_count: current.param_count,
            locals: current.locals,
            body,
            frame_size,
        });
        self.items.push(Item::Func(index));
        Ok(())
    }

    /// `int '*'* ident ('[' num ']')? ';'` as a local or global.
    fn parse_var_decl(&mut self) -> Result<Node, CompileError> {
        let base_ty = self.parse_type_prefix()?;
        let name_tok = self
            .consume_ident()
            .ok_or_else(|| self.error_here("Expected an identifier."))?;
        if self.check("(") {
            return Err(CompileError::at(
                name_tok.offset,
                "Nested function definition is not supported.",
            ));
        }
        let ty = if self.consume("[") {
            let len_offset = self.peek().offset;
            let len = self.expect_number()?;
            if len < 0 {
                return Err(CompileError::at(len_offset, "Invalid array size."));
            }
            self.expect("]")?;
            Type::array_of(base_ty, len as usize)
        } else {
            base_ty
        };
        self.expect(";")?;
        self.declare(&name_tok, ty)?;
        Ok(Node::new(NodeKind::VarDecl))
    }

    fn declare(&mut self, tok: &Token, ty: Type) -> Result<(), CompileError> {
        match &mut self.current_fn {
            Some(func) => {
                if func.locals.iter().any(|v| v.name == tok.text) {
                    return Err(CompileError::at(
                        tok.offset,
                        format!("Redeclaration of `{}`.", tok.text),
                    ));
                }
                let offset = next_local_offset(&func.locals, &ty);
                func.locals.push(Variable {
                    name: tok.text.clone(),
                    ty,
                    offset,
                });
            }
            None => {
                if self.globals.iter().any(|g| g.name == tok.text) {
                    return Err(CompileError::at(
                        tok.offset,
                        format!("Redeclaration of `{}`.", tok.text),
                    ));
                }
                self.globals.push(GlobalVar {
                    name: tok.text.clone(),
                    ty,
                });
            }
        }
        Ok(())
    }

    /// Hidden slot for the compound-assignment desugar. Unnamed, so
    /// identifier lookup never sees it.
    fn new_hidden_local(&mut self, ty: Type, offset: usize) -> Result<i64, CompileError> {
        let func = self.current_fn.as_mut().ok_or_else(|| {
            CompileError::at(
                offset,
                "Compound assignment is not supported outside a function.",
            )
        })?;
        let slot = next_local_offset(&func.locals, &ty);
        func.locals.push(Variable {
            name: String::new(),
            ty,
            offset: slot,
        });
        Ok(slot)
    }

    fn resolve_var(&self, tok: &Token) -> Result<Node, CompileError> {
        if let Some(func) = &self.current_fn {
            if let Some(var) = func
                .locals
                .iter()
                .find(|v| !v.name.is_empty() && v.name == tok.text)
            {
                return Ok(Node::typed(
                    NodeKind::LocalVar {
                        name: var.name.clone(),
                        offset: var.offset,
                    },
                    var.ty.clone(),
                ));
            }
        }
        if let Some(global) = self.globals.iter().find(|g| g.name == tok.text) {
            return Ok(Node::typed(
                NodeKind::GlobalVar {
                    name: global.name.clone(),
                },
                global.ty.clone(),
            ));
        }
        Err(CompileError::at(
            tok.offset,
            format!("Undeclared identifier `{}`.", tok.text),
        ))
    }

    /// The callee must already be defined, or be the function currently
    /// being parsed (recursion).
    fn resolve_call(&self, tok: &Token) -> Result<(usize, Type), CompileError> {
        if let Some(index) = self.funcs.iter().position(|f| f.name == tok.text) {
            return Ok((index, self.funcs[index].ret_type.clone()));
        }
        if let Some(current) = &self.current_fn {
            if current.name == tok.text {
                return Ok((self.funcs.len(), current.ret_type.clone()));
            }
        }
        Err(CompileError::at(
            tok.offset,
            format!("Undeclared function `{}`.", tok.text),
        ))
    }

    /*** statements ***/

    fn parse_statement(&mut self) -> Result<Node, CompileError> {
        if self.consume_kind(TokenKind::Return) {
            let value = self.parse_expression()?;
            self.expect(";")?;
            return Ok(Node::new(NodeKind::Return(Box::new(value))));
        }

        if self.consume_kind(TokenKind::If) {
            self.expect("(")?;
            let cond = Box::new(self.parse_expression()?);
            self.expect(")")?;
            let then = Box::new(self.parse_statement()?);
            let els = if self.consume_kind(TokenKind::Else) {
                Some(Box::new(self.parse_statement()?))
            } else {
                None
            };
            return Ok(Node::new(NodeKind::If { cond, then, els }));
        }

        if self.consume_kind(TokenKind::While) {
            self.expect("(")?;
            let cond = Box::new(self.parse_expression()?);
            self.expect(")")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Node::new(NodeKind::While { cond, body }));
        }

        if self.consume_kind(TokenKind::For) {
            self.expect("(")?;
            let init = if self.consume(";") {
                None
            } else {
                let node = self.parse_expression()?;
                self.expect(";")?;
                Some(Box::new(node))
            };
            let cond = if self.consume(";") {
                None
            } else {
                let node = self.parse_expression()?;
                self.expect(";")?;
                Some(Box::new(node))
            };
            let step = if self.check(")") {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            self.expect(")")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Node::new(NodeKind::For {
                init,
                cond,
                step,
                body,
            }));
        }

        if self.consume("{") {
            let mut stmts = Vec::new();
            while !self.consume("}") {
                if self.at_eof() {
                    return Err(self.error_here("Expected `}`."));
                }
                stmts.push(self.parse_statement()?);
            }
            return Ok(Node::new(NodeKind::Block(stmts)));
        }

        if self.check_kind(TokenKind::Int) {
            return self.parse_var_decl();
        }

        let node = self.parse_expression()?;
        self.expect(";")?;
        Ok(node)
    }

    /*** expressions ***/

    pub fn parse_expression(&mut self) -> Result<Node, CompileError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Node, CompileError> {
        let node = self.parse_equality()?;

        if self.consume("=") {
            let rhs = self.parse_assignment()?;
            return Ok(Node::new(NodeKind::Assign {
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            }));
        }

        for (text, op) in COMPOUND_OPS {
            if self.check(text) {
                let op_offset = self.peek().offset;
                self.pos += 1;
                let rhs = self.parse_assignment()?;
                return self.build_compound_assign(node, op, rhs, op_offset);
            }
        }

        Ok(node)
    }

    fn parse_equality(&mut self) -> Result<Node, CompileError> {
        let mut node = self.parse_relational()?;
        loop {
            if self.consume("==") {
                node = Node::binary(BinaryOp::Eq, node, self.parse_relational()?);
            } else if self.consume("!=") {
                node = Node::binary(BinaryOp::Neq, node, self.parse_relational()?);
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_relational(&mut self) -> Result<Node, CompileError> {
        let mut node = self.parse_add()?;
        loop {
            if self.consume("<") {
                node = Node::binary(BinaryOp::Lt, node, self.parse_add()?);
            } else if self.consume(">") {
                // a > b  ==  b < a
                node = Node::binary(BinaryOp::Lt, self.parse_add()?, node);
            } else if self.consume("<=") {
                node = Node::binary(BinaryOp::Ngt, node, self.parse_add()?);
            } else if self.consume(">=") {
                node = Node::binary(BinaryOp::Ngt, self.parse_add()?, node);
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_add(&mut self) -> Result<Node, CompileError> {
        let mut node = self.parse_mul_div()?;
        loop {
            if self.check("+") {
                let op_offset = self.peek().offset;
                self.pos += 1;
                let rhs = self.parse_mul_div()?;
                node = pointer_aware_add(node, rhs, op_offset)?;
            } else if self.check("-") {
                let op_offset = self.peek().offset;
                self.pos += 1;
                let rhs = self.parse_mul_div()?;
                node = pointer_aware_sub(node, rhs, op_offset)?;
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_mul_div(&mut self) -> Result<Node, CompileError> {
        let mut node = self.parse_unary()?;
        loop {
            if self.consume("*") {
                node = Node::binary(BinaryOp::Mul, node, self.parse_unary()?);
            } else if self.consume("/") {
                node = Node::binary(BinaryOp::Div, node, self.parse_unary()?);
            } else if self.consume("%") {
                node = Node::binary(BinaryOp::Mod, node, self.parse_unary()?);
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Node, CompileError> {
        if self.consume_kind(TokenKind::Sizeof) {
            // folded at compile time; the operand emits no code
            let mut operand = self.parse_unary()?;
            typing::annotate(&mut operand);
            let size = operand.ty.as_ref().map_or(Type::Int.size(), Type::size);
            return Ok(Node::num(size));
        }

        if self.consume("+") {
            return self.parse_primary();
        }
        if self.consume("-") {
            let operand = self.parse_primary()?;
            return Ok(Node::binary(BinaryOp::Sub, Node::num(0), operand));
        }

        if self.check("++") || self.check("--") {
            let op_tok = self.peek().clone();
            self.pos += 1;
            let target = self.parse_lval()?;
            let op = if op_tok.text == "++" {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            return self.build_compound_assign(target, op, Node::num(1), op_tok.offset);
        }

        if self.consume("*") {
            let inner = self.parse_deref_target()?;
            return Ok(Node::new(NodeKind::Deref(Box::new(inner))));
        }
        if self.consume("&") {
            let inner = self.parse_lval()?;
            return Ok(Node::new(NodeKind::AddrOf(Box::new(inner))));
        }

        if self.check_kind(TokenKind::Ident) {
            let next = self.token_at(self.pos + 1);
            if next.kind == TokenKind::Reserved && next.text == "(" {
                return self.parse_primary();
            }
            let lval = self.parse_lval()?;
            if self.check("++") || self.check("--") {
                let op_tok = self.peek().clone();
                self.pos += 1;
                // x++ yields the value before the update
                return if op_tok.text == "++" {
                    let updated =
                        self.build_compound_assign(lval, BinaryOp::Add, Node::num(1), op_tok.offset)?;
                    pointer_aware_sub(updated, Node::num(1), op_tok.offset)
                } else {
                    let updated =
                        self.build_compound_assign(lval, BinaryOp::Sub, Node::num(1), op_tok.offset)?;
                    pointer_aware_add(updated, Node::num(1), op_tok.offset)
                };
            }
            return Ok(lval);
        }

        self.parse_primary()
    }

    /// Operand position of a `*` dereference.
    fn parse_deref_target(&mut self) -> Result<Node, CompileError> {
        if self.consume("*") {
            let inner = self.parse_deref_target()?;
            return Ok(Node::new(NodeKind::Deref(Box::new(inner))));
        }
        if self.consume("&") {
            let inner = self.parse_lval()?;
            return Ok(Node::new(NodeKind::AddrOf(Box::new(inner))));
        }
        if self.consume("(") {
            let node = self.parse_expression()?;
            self.expect(")")?;
            return Ok(node);
        }
        self.parse_lval()
    }

    /// An addressable form: a dereference or a (possibly indexed)
    /// identifier.
    fn parse_lval(&mut self) -> Result<Node, CompileError> {
        if self.consume("*") {
            let inner = self.parse_deref_target()?;
            return Ok(Node::new(NodeKind::Deref(Box::new(inner))));
        }
        let tok = self
            .consume_ident()
            .ok_or_else(|| self.error_here("Expected an identifier."))?;
        let var = self.resolve_var(&tok)?;
        if self.check("[") {
            let op_offset = self.peek().offset;
            self.pos += 1;
            let index = self.parse_expression()?;
            self.expect("]")?;
            let sum = pointer_aware_add(var, index, op_offset)?;
            return Ok(Node::new(NodeKind::Deref(Box::new(sum))));
        }
        Ok(var)
    }

    fn parse_primary(&mut self) -> Result<Node, CompileError> {
        if self.consume("(") {
            let node = self.parse_expression()?;
            self.expect(")")?;
            return Ok(node);
        }

        let next = self.token_at(self.pos + 1);
        if self.check_kind(TokenKind::Ident)
            && next.kind == TokenKind::Reserved
            && next.text == "("
        {
            let name_tok = self
                .consume_ident()
                .ok_or_else(|| self.error_here("Expected an identifier."))?;
            self.expect("(")?;
            let mut args = Vec::new();
            if !self.consume(")") {
                loop {
                    args.push(self.parse_expression()?);
                    if !self.consume(",") {
                        break;
                    }
                }
                self.expect(")")?;
            }
            // reverse order is what the emitter wants: materializing the
            // stored list leaves the first argument on top of the stack
            args.reverse();
            let (func, ret_type) = self.resolve_call(&name_tok)?;
            return Ok(Node::typed(
                NodeKind::Call {
                    name: name_tok.text,
                    args,
                    func,
                },
                ret_type,
            ));
        }

        if self.check_kind(TokenKind::Ident) {
            return self.parse_lval();
        }

        let value = self.expect_number()?;
        Ok(Node::num(value))
    }

    /// `lhs OP= rhs` without evaluating `lhs` twice: stash its address in
    /// a hidden slot, then read-modify-write through that slot.
    fn build_compound_assign(
        &mut self,
        lhs: Node,
        op: BinaryOp,
        rhs: Node,
        op_offset: usize,
    ) -> Result<Node, CompileError> {
        let mut lhs = lhs;
        typing::annotate(&mut lhs);
        let lhs_ty = lhs.ty.clone().unwrap_or(Type::Int);
        let tmp_ty = Type::pointer_to(lhs_ty);
        let tmp_offset = self.new_hidden_local(tmp_ty.clone(), op_offset)?;
        let tmp_var = || {
            Node::typed(
                NodeKind::LocalVar {
                    name: String::new(),
                    offset: tmp_offset,
                },
                tmp_ty.clone(),
            )
        };

        let save = Node::new(NodeKind::Assign {
            lhs: Box::new(tmp_var()),
            rhs: Box::new(Node::new(NodeKind::AddrOf(Box::new(lhs)))),
        });
        let read = Node::new(NodeKind::Deref(Box::new(tmp_var())));
        let value = match op {
            BinaryOp::Add => pointer_aware_add(read, rhs, op_offset)?,
            BinaryOp::Sub => pointer_aware_sub(read, rhs, op_offset)?,
            _ => Node::binary(op, read, rhs),
        };
        let store = Node::new(NodeKind::Assign {
            lhs: Box::new(Node::new(NodeKind::Deref(Box::new(tmp_var())))),
            rhs: Box::new(value),
        });
        Ok(Node::new(NodeKind::Comma {
            lhs: Box::new(save),
            rhs: Box::new(store),
        }))
    }
}

fn next_local_offset(locals: &[Variable], ty: &Type) -> i64 {
    let used = locals
        .iter()
        .map(|v| v.offset)
        .filter(|&offset| offset > 0)
        .max()
        .unwrap_or(0);
    let slot = match ty {
        // the array variable gets its own slot ahead of the elements
        Type::Array(_, len) => 8 + 8 * *len as i64,
        _ => 8,
    };
    used + slot
}

fn scale_index(index: Node) -> Node {
    Node::binary(BinaryOp::Mul, index, Node::num(PTR_SCALE))
}

/// `+` with pointer scaling. `int + ptr` commutes so the pointer is
/// always the left operand (and so the result type).
fn pointer_aware_add(lhs: Node, rhs: Node, op_offset: usize) -> Result<Node, CompileError> {
    let mut lhs = lhs;
    let mut rhs = rhs;
    typing::annotate(&mut lhs);
    typing::annotate(&mut rhs);
    let lhs_ptr = lhs.ty.as_ref().is_some_and(Type::is_pointer_like);
    let rhs_ptr = rhs.ty.as_ref().is_some_and(Type::is_pointer_like);
    match (lhs_ptr, rhs_ptr) {
        (false, false) => Ok(Node::binary(BinaryOp::Add, lhs, rhs)),
        (true, false) => Ok(Node::binary(BinaryOp::Add, lhs, scale_index(rhs))),
        (false, true) => Ok(Node::binary(BinaryOp::Add, rhs, scale_index(lhs))),
        (true, true) => Err(CompileError::at(
            op_offset,
            "Invalid operands: pointer + pointer.",
        )),
    }
}

/// `-` with pointer scaling; `ptr - ptr` is the element distance.
fn pointer_aware_sub(lhs: Node, rhs: Node, op_offset: usize) -> Result<Node, CompileError> {
    let mut lhs = lhs;
    let mut rhs = rhs;
    typing::annotate(&mut lhs);
    typing::annotate(&mut rhs);
    let lhs_ptr = lhs.ty.as_ref().is_some_and(Type::is_pointer_like);
    let rhs_ptr = rhs.ty.as_ref().is_some_and(Type::is_pointer_like);
    match (lhs_ptr, rhs_ptr) {
        (false, false) => Ok(Node::binary(BinaryOp::Sub, lhs, rhs)),
        (true, false) => Ok(Node::binary(BinaryOp::Sub, lhs, scale_index(rhs))),
        (true, true) => {
            let diff = Node::binary(BinaryOp::Sub, lhs, rhs);
            let mut quotient = Node::binary(BinaryOp::Div, diff, Node::num(PTR_SCALE));
            quotient.ty = Some(Type::Int);
            Ok(quotient)
        }
        (false, true) => Err(CompileError::at(
            op_offset,
            "Invalid operands: integer - pointer.",
        )),
    }
}
