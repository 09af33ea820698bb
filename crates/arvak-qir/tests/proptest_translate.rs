//! Property-based tests for QIR generation.
//!
//! Random programs over the supported instruction set are translated under
//! both profiles and checked for determinism, bitcode round-trip, attribute
//! correctness and static operand encoding.

use arvak_ir::{ClbitId, Program, QubitId};
use arvak_qir::module::{Type, Value, text};
use arvak_qir::{BitcodeModule, Profile, translate};
use proptest::prelude::*;

/// Gate operations that can be applied to a program.
#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Sdg(u32),
    Tdg(u32),
    Rx(f64, u32),
    Rz(f64, u32),
    CX(u32, u32),
    CZ(u32, u32),
    Swap(u32, u32),
    Barrier,
}

impl GateOp {
    fn apply(self, program: &mut Program) {
        let _ = match self {
            GateOp::H(q) => program.h(QubitId(q)),
            GateOp::X(q) => program.x(QubitId(q)),
            GateOp::Sdg(q) => program.sdg(QubitId(q)),
            GateOp::Tdg(q) => program.tdg(QubitId(q)),
            GateOp::Rx(theta, q) => program.rx(theta, QubitId(q)),
            GateOp::Rz(theta, q) => program.rz(theta, QubitId(q)),
            GateOp::CX(c, t) => program.cx(QubitId(c), QubitId(t)),
            GateOp::CZ(c, t) => program.cz(QubitId(c), QubitId(t)),
            GateOp::Swap(a, b) => program.swap(QubitId(a), QubitId(b)),
            GateOp::Barrier => program.barrier_all(),
        };
    }
}

/// Generate a random gate operation for a program with given number of qubits.
fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let angle = prop_oneof![-10.0_f64..10.0, Just(std::f64::consts::PI), Just(0.0)];
    let single = prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::X),
        (0..num_qubits).prop_map(GateOp::Sdg),
        (0..num_qubits).prop_map(GateOp::Tdg),
        (angle.clone(), 0..num_qubits).prop_map(|(a, q)| GateOp::Rx(a, q)),
        (angle, 0..num_qubits).prop_map(|(a, q)| GateOp::Rz(a, q)),
        Just(GateOp::Barrier),
    ];
    if num_qubits < 2 {
        single.boxed()
    } else {
        let pair = (0..num_qubits, 0..num_qubits)
            .prop_filter("Operands must differ", |(a, b)| a != b);
        prop_oneof![
            3 => single,
            1 => pair.clone().prop_map(|(c, t)| GateOp::CX(c, t)),
            1 => pair.clone().prop_map(|(c, t)| GateOp::CZ(c, t)),
            1 => pair.prop_map(|(a, b)| GateOp::Swap(a, b)),
        ]
        .boxed()
    }
}

/// Generate a random program: gates first, then every qubit measured once.
///
/// Measurements come last so the program is valid under both profiles.
fn arb_program() -> impl Strategy<Value = Program> {
    (1_u32..=6).prop_flat_map(|num_qubits| {
        (
            Just(num_qubits),
            prop::collection::vec(arb_gate_op(num_qubits), 0..=20),
        )
            .prop_map(|(nq, ops)| {
                let mut program = Program::with_size("random", nq, nq);
                for op in ops {
                    op.apply(&mut program);
                }
                let _ = program.measure_all();
                program
            })
    })
}

fn arb_profile() -> impl Strategy<Value = Profile> {
    prop_oneof![Just(Profile::Base), Just(Profile::AdaptiveProfileExecution)]
}

proptest! {
    /// Translating the same program twice yields byte-identical output.
    #[test]
    fn test_translation_is_deterministic(program in arb_program(), profile in arb_profile()) {
        let first = translate(&program, profile).expect("First translation failed");
        let second = translate(&program, profile).expect("Second translation failed");

        prop_assert_eq!(first.text(), second.text(), "Text output is not deterministic");
        prop_assert_eq!(first.bytes(), second.bytes(), "Binary output is not deterministic");
    }

    /// LLVM reads back the entry point `text()` describes.
    #[test]
    fn test_bytes_round_trip(program in arb_program(), profile in arb_profile()) {
        let generated = translate(&program, profile).expect("Translation failed");
        let decoded = BitcodeModule::parse(generated.bytes()).expect("Decoding failed");

        prop_assert_eq!(decoded.entry_point(), "main");
        prop_assert_eq!(decoded.profile().expect("Missing profile"), profile);
        prop_assert_eq!(
            decoded.entry_attributes(),
            &text::entry_attributes(generated.text())
        );
    }

    /// Base attributes equal the declared register sizes.
    #[test]
    fn test_base_attributes_equal_declared_sizes(
        (num_qubits, ops) in (1_u32..=16).prop_flat_map(|n| {
            (Just(n), prop::collection::vec(arb_gate_op(n), 0..=10))
        }),
        num_clbits in 0_u32..=16,
    ) {
        let mut program = Program::with_size("sized", num_qubits, num_clbits);
        for op in ops {
            op.apply(&mut program);
        }
        let generated = translate(&program, Profile::Base).expect("Translation failed");

        prop_assert_eq!(generated.required_qubits(), num_qubits);
        prop_assert_eq!(generated.required_results(), num_clbits);
    }

    /// Adaptive attributes count distinct qubits touched and measurements taken.
    #[test]
    fn test_adaptive_attributes_count_usage(program in arb_program()) {
        let generated = translate(&program, Profile::AdaptiveProfileExecution)
            .expect("Translation failed");
        let allocations = generated
            .text()
            .matches("call %Qubit* @__quantum__rt__qubit_allocate()")
            .count();

        prop_assert_eq!(generated.required_qubits() as usize, allocations);
        prop_assert_eq!(generated.required_results(), program.num_qubits());
    }

    /// Static operands are `null` for index 0 and `inttoptr` of exactly n otherwise.
    #[test]
    fn test_static_operand_encoding(num_qubits in 1_u32..=64, target in 0_u32..64) {
        let target = target % num_qubits;
        let mut program = Program::with_size("operand", num_qubits, 1);
        program.h(QubitId(target)).expect("h");
        program.measure(QubitId(target), ClbitId(0)).expect("measure");

        let generated = translate(&program, Profile::Base).expect("Translation failed");
        let entry = generated.module().entry_point().expect("entry point");
        let qubit = Value::static_qubit(target);
        let expected = if target == 0 {
            Value::Null(Type::Qubit)
        } else {
            Value::IntToPtr(Type::Qubit, u64::from(target))
        };
        prop_assert_eq!(&qubit, &expected);

        let rendered = if target == 0 {
            "%Qubit* null".to_string()
        } else {
            format!("%Qubit* inttoptr (i64 {target} to %Qubit*)")
        };
        let h_line = format!("call void @__quantum__qis__h__body({rendered})");
        prop_assert!(generated.text().contains(&h_line));
        prop_assert_eq!(entry.blocks.len(), 1);
    }
}
