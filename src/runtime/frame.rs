//! Stack frames.
use crate::access::AccessFlags;
use crate::attribute::CodeAttribute;
use crate::constant_pool::ConstantPool;
use crate::descriptor::MethodDescriptor;
use crate::error::RuntimeError;
use crate::member::MemberInfo;
use crate::runtime::local_vars::LocalVars;
use crate::runtime::operand_stack::OperandStack;

/// Activation record of a single method call. A frame is created zeroed
/// when the method is entered and dropped when it returns or unwinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    local_vars: LocalVars,
    operand_stack: OperandStack,
}

impl Frame {
    #[must_use]
    pub fn new(max_locals: usize, max_stack: usize) -> Self {
        Self {
            local_vars: LocalVars::new(max_locals),
            operand_stack: OperandStack::new(max_stack),
        }
    }

    /// Sizes a frame after a method body.
    #[must_use]
    pub fn from_code(code: &CodeAttribute) -> Self {
        Self::new(code.max_locals as usize, code.max_stack as usize)
    }

    /// Builds the frame for invoking `method`. The method must have a body
    /// and enough local slots to receive its arguments.
    pub fn for_method(
        method: &MemberInfo,
        pool: &ConstantPool,
    ) -> Result<Self, RuntimeError> {
        let name = method.name(pool)?;
        let code = method.code().ok_or_else(|| RuntimeError::MissingCode {
            method: name.to_owned(),
        })?;

        let descriptor: MethodDescriptor = method.descriptor(pool)?.parse()?;
        let is_static = method.access_flags.contains(AccessFlags::STATIC);
        let needed = descriptor.parameter_slots(is_static);
        if needed > code.max_locals as usize {
            return Err(RuntimeError::LocalsTooSmall {
                method: name.to_owned(),
                needed,
                max_locals: code.max_locals as usize,
            });
        }
        Ok(Self::from_code(code))
    }

    #[must_use]
    pub fn local_vars(&self) -> &LocalVars {
        &self.local_vars
    }

    pub fn local_vars_mut(&mut self) -> &mut LocalVars {
        &mut self.local_vars
    }

    #[must_use]
    pub fn operand_stack(&self) -> &OperandStack {
        &self.operand_stack
    }

    pub fn operand_stack_mut(&mut self) -> &mut OperandStack {
        &mut self.operand_stack
    }
}
