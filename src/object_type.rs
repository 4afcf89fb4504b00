//! Object types

use crate::{
    Connection, ObjectAttr, Result,
    conn::ConnData,
    err::{ErrorContext, ErrorKind},
    gen::{self, HandleId, OwnedRef},
    object_attr,
    oci::{*, attr, param},
};
use libc::c_void;

pub(crate) struct ObjectTypeData {
    conn: OwnedRef<ConnData>,
    // Describe parameter of the type, owned by the caller. None when the type was read
    // from an attribute parameter, which does not list the type's attributes.
    param: Option<Ptr<OCIParam>>,
    schema: String,
    name: String,
    type_code: u16,
    num_attributes: u16,
}

impl ObjectTypeData {
    pub(crate) fn conn(&self) -> &OwnedRef<ConnData> {
        &self.conn
    }
}

/**
    Reads the description of an object type from the parameter `param`.
    `name_attr` is the attribute that holds the type name: `OCI_ATTR_NAME` for the describe
    parameter of a type, `OCI_ATTR_TYPE_NAME` for the parameter of an object attribute.
    An attribute parameter only names its type, so such a type has no attributes to list.
*/
pub(crate) fn allocate(conn: HandleId, ctx: &mut ErrorContext, param: Ptr<OCIParam>, name_attr: u32, fn_name: &'static str) -> Result<OwnedRef<ObjectTypeData>> {
    let conn = gen::retain::<ConnData>(conn, fn_name)?;
    let obj = param.get() as *const c_void;
    let schema : Vec<u8> = attr::get(ctx, Some(&*conn), obj, OCI_DTYPE_PARAM, OCI_ATTR_SCHEMA_NAME, "get schema name")?;
    let name : Vec<u8> = attr::get(ctx, Some(&*conn), obj, OCI_DTYPE_PARAM, name_attr, "get name")?;
    let type_code : u16 = attr::get(ctx, Some(&*conn), obj, OCI_DTYPE_PARAM, OCI_ATTR_TYPECODE, "get type code")?;
    let (param, num_attributes) = if name_attr == OCI_ATTR_TYPE_NAME {
        (None, 0)
    } else {
        let num_attributes : u16 = attr::get(ctx, Some(&*conn), obj, OCI_DTYPE_PARAM, OCI_ATTR_NUM_TYPE_ATTRS, "get number of attributes")?;
        (Some(param), num_attributes)
    };
    let env = ctx.env().clone();
    let data = ObjectTypeData {
        conn, param, type_code, num_attributes,
        schema: env.decode(&schema),
        name: env.decode(&name),
    };
    gen::allocate(&env, data, fn_name)
}

/// Description of an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTypeInfo {
    pub schema: String,
    pub name: String,
    pub is_collection: bool,
    pub num_attributes: u16,
}

/**
    Represents an object type.

    An object type keeps its connection alive. Each attribute returned by
    [`attributes`](ObjectType::attributes) keeps its object type alive.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectType(HandleId);

impl_generic_handle!(ObjectType, ObjectTypeData);

impl ObjectType {
    /**
        Creates an object type from its describe parameter.

        # Safety

        `param` must be the parameter of a described object type, obtained through `conn`,
        and it must remain valid for as long as the returned handle or any of its attributes
        is alive.
    */
    pub unsafe fn from_param(conn: Connection, param: *mut OCIParam) -> Result<Self> {
        const FN_NAME : &str = "ObjectType::from_param";
        let (_, mut ctx) = gen::start_public_fn::<ConnData>(conn.handle(), FN_NAME)?;
        if param.is_null() {
            return Err( ctx.set("check parameter", ErrorKind::NullHandle("parameter")) );
        }
        let typ = allocate(conn.handle(), &mut ctx, Ptr::new(param), OCI_ATTR_NAME, FN_NAME)?;
        Ok( Self(typ.into_handle()) )
    }

    pub fn info(&self) -> Result<ObjectTypeInfo> {
        let (typ, _ctx) = gen::start_public_fn::<ObjectTypeData>(self.0, "ObjectType::info")?;
        Ok( ObjectTypeInfo {
            schema: typ.schema.clone(),
            name: typ.name.clone(),
            is_collection: typ.type_code == OCI_TYPECODE_NAMEDCOLLECTION,
            num_attributes: typ.num_attributes,
        })
    }

    /**
        Returns the attributes of the type. The caller owns one reference to each of them.

        Fails with [`ErrorKind::NotDescribed`] for the type of an object attribute, which is
        known by name only.
    */
    pub fn attributes(&self) -> Result<Vec<ObjectAttr>> {
        const FN_NAME : &str = "ObjectType::attributes";
        let (typ, mut ctx) = gen::start_public_fn::<ObjectTypeData>(self.0, FN_NAME)?;
        let param = match &typ.param {
            Some( param ) => param.get(),
            None => {
                let name = format!("{}.{}", typ.schema, typ.name);
                return Err( ctx.set("get list parameter", ErrorKind::NotDescribed(name)) );
            }
        };
        let list : Ptr<OCIParam> = attr::get(&mut ctx, Some(&*typ.conn), param as _, OCI_DTYPE_PARAM, OCI_ATTR_LIST_TYPE_ATTRS, "get list parameter")?;
        let mut attrs = Vec::with_capacity(typ.num_attributes as usize);
        for pos in 1..=u32::from(typ.num_attributes) {
            let param = param::get(&mut ctx, Some(&*typ.conn), list, OCI_DTYPE_PARAM, pos)?;
            attrs.push(object_attr::allocate(self.0, &mut ctx, param, FN_NAME)?);
        }
        Ok( attrs.into_iter().map(|attr| ObjectAttr::from_handle(attr.into_handle())).collect() )
    }
}
