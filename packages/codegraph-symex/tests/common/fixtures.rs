//! Test fixtures
//!
//! Small method bodies written as the stack code a front end would emit for them. The
//! equivalent source is given on each fixture.

use codegraph_symex::shared::models::{
    ArithmeticOp, Instruction, Literal, MethodId, Nullability, SemanticModel, Terminator,
};
use codegraph_symex::RelationKind;

use super::builders::{call, call_on, MethodBuilder};

pub const NULL_OR_FLAG: &str = "com.acme.Fixture#method(Ljava/lang/Object;Z)Z";
pub const FLAG_TO_BOOLEAN: &str = "com.acme.Fixture#flag(Ljava/lang/Object;)Z";
pub const UNKNOWN_FLAG: &str = "com.acme.Flags#enabled()Z";
pub const PING: &str = "com.acme.Cycle#ping(Ljava/lang/Object;)V";
pub const PONG: &str = "com.acme.Cycle#pong(Ljava/lang/Object;)V";
pub const DEREFERENCE: &str = "com.acme.Npe#dereference(Ljava/lang/Object;)V";
pub const PASS_NULL: &str = "com.acme.Npe#passNull()V";
pub const FORWARD: &str = "com.acme.Npe#forward(Ljava/lang/Object;)V";
pub const TO_STRING: &str = "java.lang.Object#toString()Ljava/lang/String;";
pub const REQUIRE_NON_NULL: &str =
    "java.util.Objects#requireNonNull(Ljava/lang/Object;)Ljava/lang/Object;";
pub const GUARDED: &str = "com.acme.Npe#guarded(Ljava/lang/Object;)V";
pub const DIVIDE_BY_ZERO: &str = "com.acme.Math#divideByZero(I)I";
pub const READ: &str = "com.acme.Io#read()V";
pub const READ_OR_NULL: &str = "com.acme.Io#readOrNull()Ljava/lang/Object;";
pub const READ_UNGUARDED: &str = "com.acme.Io#readUnguarded()Ljava/lang/Object;";

/// ```text
/// boolean method(Object a, boolean b) {
///   if (a == null) return true;
///   if (b) return false;
///   return b;
/// }
/// ```
pub fn fixture_null_or_flag(model: &mut SemanticModel) -> MethodId {
    let mut m = MethodBuilder::new(model, NULL_OR_FLAG);
    let a = m.param("a", "java.lang.Object");
    let b = m.param("b", "boolean");

    let test_a = m.block();
    let return_true = m.block_with(
        vec![Instruction::Literal(Literal::Bool(true))],
        Terminator::Return,
    );
    let test_b = m.block();
    let return_false = m.block_with(
        vec![Instruction::Literal(Literal::Bool(false))],
        Terminator::Return,
    );
    let return_b = m.block_with(vec![Instruction::Load(b)], Terminator::Return);

    m.fill(
        test_a,
        vec![
            Instruction::Load(a),
            Instruction::Literal(Literal::Null),
            Instruction::Compare(RelationKind::Equal),
        ],
        Terminator::Branch {
            when_true: return_true,
            when_false: test_b,
        },
    );
    m.fill(
        test_b,
        vec![Instruction::Load(b)],
        Terminator::Branch {
            when_true: return_false,
            when_false: return_b,
        },
    );
    m.build()
}

/// ```text
/// boolean flag(Object o) {
///   if (Flags.enabled()) return true;
///   return false;
/// }
/// ```
pub fn fixture_flag_to_boolean(model: &mut SemanticModel) -> MethodId {
    let mut m = MethodBuilder::new(model, FLAG_TO_BOOLEAN);
    m.param("o", "java.lang.Object");

    let test = m.block();
    let return_true = m.block_with(
        vec![Instruction::Literal(Literal::Bool(true))],
        Terminator::Return,
    );
    let return_false = m.block_with(
        vec![Instruction::Literal(Literal::Bool(false))],
        Terminator::Return,
    );
    m.fill(
        test,
        vec![call(UNKNOWN_FLAG, 0)],
        Terminator::Branch {
            when_true: return_true,
            when_false: return_false,
        },
    );
    m.build()
}

/// ```text
/// static void ping(Object o) { pong(o); }
/// static void pong(Object o) { ping(o); }
/// ```
pub fn fixture_ping_pong(model: &mut SemanticModel) -> (MethodId, MethodId) {
    let ping = calling(model, PING, PONG);
    let pong = calling(model, PONG, PING);
    (ping, pong)
}

/// `static void <signature>(Object o) { <callee>(o); }`
pub fn calling(model: &mut SemanticModel, signature: &str, callee: &str) -> MethodId {
    let mut m = MethodBuilder::new(model, signature);
    let o = m.param("o", "java.lang.Object");
    m.block_with(
        vec![Instruction::Load(o), call(callee, 1)],
        Terminator::ReturnVoid,
    );
    m.build()
}

/// ```text
/// static void dereference(@Nullable Object o) { o.toString(); }
/// ```
pub fn fixture_dereference(model: &mut SemanticModel) -> MethodId {
    let mut m = MethodBuilder::new(model, DEREFERENCE);
    let o = m.param_with("o", "java.lang.Object", Nullability::Nullable);
    m.block_with(
        vec![Instruction::Load(o), call_on(TO_STRING, 0), Instruction::Pop],
        Terminator::ReturnVoid,
    );
    m.build()
}

/// ```text
/// static void forward(Object o) { dereference(o); }
/// ```
pub fn fixture_forward(model: &mut SemanticModel) -> MethodId {
    calling(model, FORWARD, DEREFERENCE)
}

/// ```text
/// static void passNull() { dereference(null); }
/// ```
pub fn fixture_pass_null(model: &mut SemanticModel) -> MethodId {
    let mut m = MethodBuilder::new(model, PASS_NULL);
    m.block_with(
        vec![Instruction::Literal(Literal::Null), call(DEREFERENCE, 1)],
        Terminator::ReturnVoid,
    );
    m.build()
}

/// ```text
/// static void guarded(@Nullable Object o) {
///   Objects.requireNonNull(o);
///   o.toString();
/// }
/// ```
pub fn fixture_guarded(model: &mut SemanticModel) -> MethodId {
    let mut m = MethodBuilder::new(model, GUARDED);
    let o = m.param_with("o", "java.lang.Object", Nullability::Nullable);
    m.block_with(
        vec![
            Instruction::Load(o),
            call(REQUIRE_NON_NULL, 1),
            Instruction::Pop,
            Instruction::Load(o),
            call_on(TO_STRING, 0),
            Instruction::Pop,
        ],
        Terminator::ReturnVoid,
    );
    m.build()
}

/// ```text
/// static int divideByZero(int x) { return x / 0; }
/// ```
pub fn fixture_divide_by_zero(model: &mut SemanticModel) -> MethodId {
    let mut m = MethodBuilder::new(model, DIVIDE_BY_ZERO);
    let x = m.param("x", "int");
    m.block_with(
        vec![
            Instruction::Load(x),
            Instruction::Literal(Literal::Int(0)),
            Instruction::Arithmetic(ArithmeticOp::Div),
        ],
        Terminator::Return,
    );
    m.build()
}

/// ```text
/// static void read() throws IOException;   // no body
///
/// static Object readOrNull() {
///   try { read(); } catch (IOException e) { return null; }
///   return new Object();
/// }
///
/// static Object readUnguarded() throws IOException {
///   read();
///   return new Object();
/// }
/// ```
pub fn fixture_read(model: &mut SemanticModel) -> (MethodId, MethodId) {
    let mut read = MethodBuilder::new(model, READ);
    read.declared_exception("java.io.IOException");
    read.build_without_body();

    let mut m = MethodBuilder::new(model, READ_OR_NULL);
    let e = m.local("e", "java.io.IOException");
    let protected = m.block();
    let return_new = m.block_with(
        vec![Instruction::New {
            type_name: "java.lang.Object".to_string(),
        }],
        Terminator::Return,
    );
    let catch = m.block_with(
        vec![Instruction::Literal(Literal::Null)],
        Terminator::Return,
    );
    m.fill(protected, vec![call(READ, 0)], Terminator::Goto(return_new));
    m.handler(protected, "java.io.IOException", catch, Some(e));
    let guarded = m.build();

    let mut m = MethodBuilder::new(model, READ_UNGUARDED);
    m.declared_exception("java.io.IOException");
    m.block_with(
        vec![
            call(READ, 0),
            Instruction::New {
                type_name: "java.lang.Object".to_string(),
            },
        ],
        Terminator::Return,
    );
    let unguarded = m.build();

    (guarded, unguarded)
}
