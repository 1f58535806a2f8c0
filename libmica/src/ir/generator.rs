// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `generator` module implements the lowering pass.
//!
//! The pass assumes the analyzer has already accepted the tree; any inconsistency it
//! meets (an unresolved name, a `break` with no loop) is an ICE, never a diagnostic.
//! Every expression lowers to a [RegisterDescriptor], which carries the operand text
//! plus whatever is statically known about the value. Two rules shape the output:
//!
//! - Every basic block ends with exactly one terminator and nothing follows it;
//!   statements that would be emitted after a terminator open a fresh unreachable
//!   block instead.
//! - A statically-zero divisor never reaches `sdiv`. The division lowers to a
//!   runtime-error sequence (print the message, exit) and yields a zero immediate in
//!   the continuation block.

use crate::ast::{BinOp, CallExp, Exp, ExpKind, FuncDecl, Program, RelOp, Statement, StatementKind, Type};
use crate::core::RegisterDescriptor;
use crate::sema::symbol_table::SymbolTable;
use crate::ICE;

use super::code_buffer::CodeBuffer;

/// Runtime support emitted at the top of every module: the libc externs and the
/// `print`/`printi` wrappers the language's built-ins map onto.
const RUNTIME_PRELUDE: &str = "\
declare i32 @printf(i8*, ...)
declare void @exit(i32)

@.int_format = constant [4 x i8] c\"%d\\0A\\00\"
define void @printi(i32) {
\t%format = getelementptr [4 x i8], [4 x i8]* @.int_format, i32 0, i32 0
\tcall i32 (i8*, ...) @printf(i8* %format, i32 %0)
\tret void
}

@.str_format = constant [4 x i8] c\"%s\\0A\\00\"
define void @print(i8*) {
\t%format = getelementptr [4 x i8], [4 x i8]* @.str_format, i32 0, i32 0
\tcall i32 (i8*, ...) @printf(i8* %format, i8* %0)
\tret void
}
";

const DIVISION_BY_ZERO_MESSAGE: &str = "Error division by zero";

/// The lowering pass. One instance lowers one program.
pub struct CodeGenerator {
    buffer: CodeBuffer,
    symbols: SymbolTable,
    block_terminated: bool,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self { buffer: CodeBuffer::new(), symbols: SymbolTable::new(), block_terminated: false }
    }

    /// Lowers the whole program and returns the module text.
    pub fn generate(mut self, program: &Program) -> String {
        self.buffer.emit_line(RUNTIME_PRELUDE);
        self.register_runtime();

        for func in &program.0 {
            let param_types = func.formals.iter().map(|f| f.ty).collect();
            let param_names = func.formals.iter().map(|f| f.name.clone()).collect();
            if self.symbols.declare_function(&func.name, func.return_type, param_types, param_names).is_err() {
                ICE!("Function '{}' declared twice after analysis", func.name);
            }
        }

        for func in &program.0 {
            self.lower_function(func);
        }

        self.buffer.finish()
    }

    fn register_runtime(&mut self) {
        // `exit` is not callable from source (the analyzer does not register it), but
        // the division guard lowers calls to it.
        let builtins: [(&str, Type); 3] = [("print", Type::String), ("printi", Type::Int), ("exit", Type::Int)];
        for (name, param) in builtins {
            if self.symbols.declare_function(name, Type::Void, vec![param], vec!["value".to_string()]).is_err() {
                ICE!("Built-in '{name}' registered twice");
            }
        }
    }

    fn lower_function(&mut self, func: &FuncDecl) {
        let return_type = if func.return_type == Type::Void { "void" } else { "i32" };
        let params = func.formals.iter().map(|_| "i32").collect::<Vec<_>>().join(", ");
        self.buffer.emit_line(format!("define {return_type} @{}({params}) {{", func.name));

        self.symbols.push_scope(Some(&func.name));
        self.block_terminated = false;

        // Copy each incoming argument (%0, %1, ...) into its own stack slot so that
        // parameters and locals are addressed uniformly.
        for (index, formal) in func.formals.iter().enumerate() {
            if self.symbols.declare_parameter(&formal.name, formal.ty).is_err() {
                ICE!("Duplicate parameter '{}' after analysis", formal.name);
            }
            let slot = self.buffer.fresh_register();
            self.buffer.emit(format!("{slot} = alloca i32"));
            self.buffer.emit(format!("store i32 %{index}, i32* {slot}"));
            self.symbols.bind_register(&formal.name, RegisterDescriptor::unknown(slot));
        }

        for statement in &func.body {
            self.lower_statement(statement);
        }

        // Fall off the end: synthesize the return the source omitted.
        if !self.block_terminated {
            let ret = if func.return_type == Type::Void { "ret void" } else { "ret i32 0" };
            self.emit_terminator(ret);
        }

        self.symbols.pop_scope();
        self.buffer.emit_line("}");
        self.buffer.emit_blank();
    }

    fn lower_statement(&mut self, statement: &Statement) {
        // A statement that follows a terminator (code after return/break/continue)
        // starts its own unreachable block so the terminator stays last in its block.
        if self.block_terminated {
            let label = self.buffer.fresh_label("dead");
            self.start_block(&label);
        }

        match &statement.kind {
            StatementKind::Call(call) => {
                self.lower_call(call);
            }
            StatementKind::Block(statements) => {
                self.symbols.push_scope(None);
                for statement in statements {
                    self.lower_statement(statement);
                }
                self.symbols.pop_scope();
            }
            StatementKind::Break => {
                let label = match self.symbols.current_scope().done_label() {
                    Some(label) => label.to_string(),
                    None => ICE!("Break statement outside a loop after analysis"),
                };
                self.emit_terminator(format!("br label %{label}"));
            }
            StatementKind::Continue => {
                let label = match self.symbols.current_scope().condition_label() {
                    Some(label) => label.to_string(),
                    None => ICE!("Continue statement outside a loop after analysis"),
                };
                self.emit_terminator(format!("br label %{label}"));
            }
            StatementKind::Return(exp) => self.lower_return(exp.as_ref()),
            StatementKind::If { cond, then, otherwise } => self.lower_if(cond, then, otherwise.as_deref()),
            StatementKind::While { cond, body } => self.lower_while(cond, body),
            StatementKind::VarDecl { name, ty, init } => self.lower_var_decl(name, *ty, init.as_ref()),
            StatementKind::Assign { name, exp } => {
                let value = self.lower_exp(exp);
                let slot = self.symbols.register_of(name).name.clone();
                self.buffer.emit(format!("store i32 {}, i32* {slot}", value.name));
                // The slot register is unchanged; the stored value's static knowledge
                // replaces whatever the slot held before.
                self.symbols.bind_register(name, RegisterDescriptor::renamed(slot, &value));
            }
        }
    }

    fn lower_var_decl(&mut self, name: &str, ty: Type, init: Option<&Exp>) {
        let slot = self.buffer.fresh_register();
        self.buffer.emit(format!("{slot} = alloca i32"));

        // The initializer is lowered before the name is declared, mirroring the
        // analyzer: `int x = x;` reads the enclosing scope's x.
        let value = match init {
            Some(init) => self.lower_exp(init),
            None => RegisterDescriptor::immediate(0),
        };
        self.buffer.emit(format!("store i32 {}, i32* {slot}", value.name));

        if self.symbols.declare_variable(name, ty).is_err() {
            ICE!("Variable '{name}' declared twice after analysis");
        }
        self.symbols.bind_register(name, RegisterDescriptor::renamed(slot, &value));
    }

    fn lower_return(&mut self, exp: Option<&Exp>) {
        let func_name = self.symbols.current_scope().name().to_string();
        let return_type = match self.symbols.resolve_function(&func_name) {
            Some(symbol) => symbol.data_type,
            None => ICE!("Return statement outside any function"),
        };

        match exp {
            Some(exp) if return_type != Type::Void => {
                let value = self.lower_exp(exp);
                self.emit_terminator(format!("ret i32 {}", value.name));
            }
            Some(exp) => {
                // `return f();` in a void function: evaluate for effect, return nothing.
                self.lower_exp(exp);
                self.emit_terminator("ret void");
            }
            None => self.emit_terminator("ret void"),
        }
    }

    fn lower_if(&mut self, cond: &Exp, then: &Statement, otherwise: Option<&Statement>) {
        let stem = self.buffer.fresh_label("if");
        let then_label = format!("{stem}.then");
        let else_label = format!("{stem}.else");
        let end_label = format!("{stem}.end");

        // The condition and the then-branch share one scope, matching name resolution
        // during analysis; the else-branch gets its own.
        self.symbols.push_scope(None);
        let cond_value = self.lower_exp(cond);
        let cond_bit = self.buffer.fresh_register();
        self.buffer.emit(format!("{cond_bit} = trunc i32 {} to i1", cond_value.name));
        self.emit_terminator(format!("br i1 {cond_bit}, label %{then_label}, label %{else_label}"));

        self.start_block(&then_label);
        self.lower_statement(then);
        if !self.block_terminated {
            self.emit_terminator(format!("br label %{end_label}"));
        }
        self.symbols.pop_scope();

        self.start_block(&else_label);
        if let Some(otherwise) = otherwise {
            self.symbols.push_scope(None);
            self.lower_statement(otherwise);
            self.symbols.pop_scope();
        }
        if !self.block_terminated {
            self.emit_terminator(format!("br label %{end_label}"));
        }

        self.start_block(&end_label);
    }

    fn lower_while(&mut self, cond: &Exp, body: &Statement) {
        let stem = self.buffer.fresh_label("while");
        let cond_label = format!("{stem}.cond");
        let body_label = format!("{stem}.body");
        let end_label = format!("{stem}.end");

        self.symbols.push_loop_scope(Some(cond_label.clone()), Some(end_label.clone()));

        self.emit_terminator(format!("br label %{cond_label}"));
        self.start_block(&cond_label);
        let cond_value = self.lower_exp(cond);
        let cond_bit = self.buffer.fresh_register();
        self.buffer.emit(format!("{cond_bit} = trunc i32 {} to i1", cond_value.name));
        self.emit_terminator(format!("br i1 {cond_bit}, label %{body_label}, label %{end_label}"));

        self.start_block(&body_label);
        self.lower_statement(body);
        if !self.block_terminated {
            self.emit_terminator(format!("br label %{cond_label}"));
        }
        self.symbols.pop_scope();

        self.start_block(&end_label);
    }

    fn lower_exp(&mut self, exp: &Exp) -> RegisterDescriptor {
        match &exp.kind {
            // Literals cost no instruction: the decimal immediate is the operand.
            ExpKind::Num(value) | ExpKind::NumB(value) => RegisterDescriptor::immediate(*value),
            ExpKind::Bool(value) => RegisterDescriptor::immediate(i64::from(*value)),
            ExpKind::Str(value) => {
                let interned = self.buffer.intern_string(value);
                let register = self.buffer.fresh_register();
                let size = interned.size;
                self.buffer.emit(format!(
                    "{register} = getelementptr [{size} x i8], [{size} x i8]* {}, i32 0, i32 0",
                    interned.identifier
                ));
                RegisterDescriptor::unknown(register)
            }
            ExpKind::Id(name) => {
                let slot = self.symbols.register_of(name).clone();
                let register = self.buffer.fresh_register();
                self.buffer.emit(format!("{register} = load i32, i32* {}", slot.name));
                RegisterDescriptor::renamed(register, &slot)
            }
            ExpKind::BinOp { op, lhs, rhs } => self.lower_bin_op(exp, *op, lhs, rhs),
            ExpKind::RelOp { op, lhs, rhs } => self.lower_rel_op(*op, lhs, rhs),
            ExpKind::Not(operand) => {
                let value = self.lower_exp(operand);
                let register = self.buffer.fresh_register();
                self.buffer.emit(format!("{register} = xor i32 {}, 1", value.name));
                match value.known_value {
                    Some(known) => RegisterDescriptor::known(register, known ^ 1),
                    None => RegisterDescriptor::unknown(register),
                }
            }
            ExpKind::And { lhs, rhs } => self.lower_short_circuit(true, lhs, rhs),
            ExpKind::Or { lhs, rhs } => self.lower_short_circuit(false, lhs, rhs),
            ExpKind::Cast { exp: operand, target } => {
                let value = self.lower_exp(operand);
                match target {
                    Type::Byte => self.truncate_to_byte(value),
                    _ => value,
                }
            }
            ExpKind::Call(call) => self.lower_call(call),
        }
    }

    fn lower_bin_op(&mut self, exp: &Exp, op: BinOp, lhs: &Exp, rhs: &Exp) -> RegisterDescriptor {
        let result_type = self.exp_type(exp);
        let left = self.lower_exp(lhs);
        let right = self.lower_exp(rhs);

        if op == BinOp::Div && right.is_zero {
            return self.lower_division_by_zero();
        }

        let known = match (left.known_value, right.known_value) {
            (Some(a), Some(b)) => Some(match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mul => a.wrapping_mul(b),
                // A statically-zero divisor was diverted above.
                BinOp::Div => a.wrapping_div(b),
            }),
            _ => None,
        };

        let statically_zero = known == Some(0)
            || match op {
                BinOp::Add => left.is_zero && right.is_zero,
                BinOp::Sub => left.name == right.name,
                BinOp::Mul => left.is_zero || right.is_zero,
                BinOp::Div => left.is_zero,
            };
        if statically_zero {
            // A statically-zero result needs no instruction at all, and a zero never
            // needs byte truncation.
            return RegisterDescriptor::immediate(0);
        }

        let mnemonic = match op {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "sdiv",
        };
        let register = self.buffer.fresh_register();
        self.buffer.emit(format!("{register} = {mnemonic} i32 {}, {}", left.name, right.name));
        let result = RegisterDescriptor { name: register, is_zero: false, known_value: known };

        // Byte arithmetic wraps: mask the result back into range.
        if result_type == Type::Byte {
            self.truncate_to_byte(result)
        } else {
            result
        }
    }

    fn truncate_to_byte(&mut self, value: RegisterDescriptor) -> RegisterDescriptor {
        if value.is_zero {
            return value;
        }
        let register = self.buffer.fresh_register();
        self.buffer.emit(format!("{register} = and i32 {}, 255", value.name));
        match value.known_value {
            Some(known) => RegisterDescriptor::known(register, known & 255),
            None => RegisterDescriptor::unknown(register),
        }
    }

    /// Lowers a division whose divisor is statically zero: report the runtime error
    /// and exit. The continuation block exists only to keep the module well-formed;
    /// its zero immediate stands in for the division's result.
    fn lower_division_by_zero(&mut self) -> RegisterDescriptor {
        let interned = self.buffer.intern_string(DIVISION_BY_ZERO_MESSAGE);
        let pointer = self.buffer.fresh_register();
        let size = interned.size;
        self.buffer.emit(format!(
            "{pointer} = getelementptr [{size} x i8], [{size} x i8]* {}, i32 0, i32 0",
            interned.identifier
        ));
        self.buffer.emit(format!("call void @print(i8* {pointer})"));
        self.buffer.emit("call void @exit(i32 0)");
        let stem = self.buffer.fresh_label("div_zero");
        self.emit_terminator(format!("br label %{stem}.cont"));
        self.start_block(&format!("{stem}.cont"));
        RegisterDescriptor::immediate(0)
    }

    fn lower_rel_op(&mut self, op: RelOp, lhs: &Exp, rhs: &Exp) -> RegisterDescriptor {
        let left = self.lower_exp(lhs);
        let right = self.lower_exp(rhs);

        let predicate = match op {
            RelOp::Eq => "eq",
            RelOp::Ne => "ne",
            RelOp::Lt => "slt",
            RelOp::Gt => "sgt",
            RelOp::Le => "sle",
            RelOp::Ge => "sge",
        };
        let bit = self.buffer.fresh_register();
        self.buffer.emit(format!("{bit} = icmp {predicate} i32 {}, {}", left.name, right.name));
        let register = self.buffer.fresh_register();
        self.buffer.emit(format!("{register} = zext i1 {bit} to i32"));
        RegisterDescriptor::unknown(register)
    }

    /// Lowers `and`/`or` with short-circuit evaluation. Both operands get an `i1`
    /// slot, pre-zeroed on the unconditional path; the right-hand side only runs (and
    /// only stores) when the left-hand side does not already decide the result. The
    /// merge block combines the two slots.
    fn lower_short_circuit(&mut self, is_and: bool, lhs: &Exp, rhs: &Exp) -> RegisterDescriptor {
        let stem = self.buffer.fresh_label(if is_and { "and" } else { "or" });
        let lhs_slot = format!("%{stem}.lhs_slot");
        let rhs_slot = format!("%{stem}.rhs_slot");
        let rhs_label = format!("{stem}.rhs");
        let end_label = format!("{stem}.end");

        self.buffer.emit(format!("{lhs_slot} = alloca i1"));
        self.buffer.emit(format!("store i1 0, i1* {lhs_slot}"));
        self.buffer.emit(format!("{rhs_slot} = alloca i1"));
        self.buffer.emit(format!("store i1 0, i1* {rhs_slot}"));

        let left = self.lower_exp(lhs);
        let left_bit = self.buffer.fresh_register();
        self.buffer.emit(format!("{left_bit} = trunc i32 {} to i1", left.name));
        self.buffer.emit(format!("store i1 {left_bit}, i1* {lhs_slot}"));
        if is_and {
            // A false left side decides an `and`.
            self.emit_terminator(format!("br i1 {left_bit}, label %{rhs_label}, label %{end_label}"));
        } else {
            // A true left side decides an `or`.
            self.emit_terminator(format!("br i1 {left_bit}, label %{end_label}, label %{rhs_label}"));
        }

        self.start_block(&rhs_label);
        let right = self.lower_exp(rhs);
        let right_bit = self.buffer.fresh_register();
        self.buffer.emit(format!("{right_bit} = trunc i32 {} to i1", right.name));
        self.buffer.emit(format!("store i1 {right_bit}, i1* {rhs_slot}"));
        self.emit_terminator(format!("br label %{end_label}"));

        self.start_block(&end_label);
        let left_value = self.buffer.fresh_register();
        self.buffer.emit(format!("{left_value} = load i1, i1* {lhs_slot}"));
        let right_value = self.buffer.fresh_register();
        self.buffer.emit(format!("{right_value} = load i1, i1* {rhs_slot}"));
        let combined = self.buffer.fresh_register();
        let mnemonic = if is_and { "and" } else { "or" };
        self.buffer.emit(format!("{combined} = {mnemonic} i1 {left_value}, {right_value}"));
        let register = self.buffer.fresh_register();
        self.buffer.emit(format!("{register} = zext i1 {combined} to i32"));
        RegisterDescriptor::unknown(register)
    }

    fn lower_call(&mut self, call: &CallExp) -> RegisterDescriptor {
        let mut operands = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let arg_type = self.exp_type(arg);
            let value = self.lower_exp(arg);
            let operand_type = if arg_type == Type::String { "i8*" } else { "i32" };
            operands.push(format!("{operand_type} {}", value.name));
        }
        let operands = operands.join(", ");

        let return_type = match self.symbols.resolve_function(&call.callee) {
            Some(symbol) => symbol.data_type,
            None => ICE!("Call to undeclared function '{}' after analysis", call.callee),
        };

        if return_type == Type::Void {
            self.buffer.emit(format!("call void @{}({operands})", call.callee));
            RegisterDescriptor::immediate(0)
        } else {
            let register = self.buffer.fresh_register();
            self.buffer.emit(format!("{register} = call i32 @{}({operands})", call.callee));
            RegisterDescriptor::unknown(register)
        }
    }

    /// Recomputes an expression's static type. The analyzer already proved the tree
    /// well-typed, so this never fails.
    fn exp_type(&self, exp: &Exp) -> Type {
        match &exp.kind {
            ExpKind::Num(_) => Type::Int,
            ExpKind::NumB(_) => Type::Byte,
            ExpKind::Str(_) => Type::String,
            ExpKind::Bool(_) => Type::Bool,
            ExpKind::Id(name) => match self.symbols.resolve(name) {
                Some(symbol) => symbol.data_type,
                None => ICE!("Unresolved identifier '{name}' after analysis"),
            },
            ExpKind::BinOp { lhs, rhs, .. } => {
                if self.exp_type(lhs) == Type::Byte && self.exp_type(rhs) == Type::Byte {
                    Type::Byte
                } else {
                    Type::Int
                }
            }
            ExpKind::RelOp { .. } | ExpKind::Not(_) | ExpKind::And { .. } | ExpKind::Or { .. } => Type::Bool,
            ExpKind::Cast { target, .. } => *target,
            ExpKind::Call(call) => match self.symbols.resolve_function(&call.callee) {
                Some(symbol) => symbol.data_type,
                None => ICE!("Call to undeclared function '{}' after analysis", call.callee),
            },
        }
    }

    fn start_block(&mut self, label: &str) {
        self.buffer.emit_block_label(label);
        self.block_terminated = false;
    }

    fn emit_terminator(&mut self, instruction: impl AsRef<str>) {
        if self.block_terminated {
            ICE!("Terminator emitted into an already-terminated block");
        }
        self.buffer.emit(instruction);
        self.block_terminated = true;
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
